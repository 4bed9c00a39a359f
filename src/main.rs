//! evolalg: 二进制编码遗传算法［命令行版］
//!
//! 用户提供配置文件（区间、精度、目标函数以及进化参数），本程序能够求出目标函数在区间上的近似最大值，
//! 输出每一代的统计数据，也可以展示编码过程或者启动 HTTP 服务。

use std::thread;

use clap::Parser;
use evolalg::codec::Codec;
use evolalg::config::Config;
use evolalg::interfaces::command_line::{Command, CommandLine, CommandLineArgs};
use evolalg::server::start_server;
use evolalg::snapshot::EpochSnapshot;
use evolalg::{Error, Solver};

fn run_solve(config: Config, cli: &CommandLine) -> Result<Vec<EpochSnapshot>, Error> {
    let Config { problem, run, .. } = config;
    let mut solver = Solver::from_config(&problem, run.seed)?;
    let history = solver.solve_with(&run, cli).map_err(|e| {
        eprintln!("{e}，已完成 {} 代", e.history.len());
        e.source
    })?;
    cli.write_results(&history)?;
    Ok(history)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();
    let args = CommandLineArgs::parse();
    match args.command.clone() {
        Command::Solve { threads, seed, .. } => {
            let cli = CommandLine::new(args, None)?;
            let mut config = cli.load_config()?;
            if seed.is_some() {
                config.run.seed = seed;
            }
            let threads = threads.unwrap_or(1);
            if threads == 1 {
                let history = run_solve(config, &cli)?;
                if let Some(last) = history.last() {
                    CommandLine::report_elite(&last.elite);
                }
            } else {
                let mut handles = vec![];
                for index in 0..threads {
                    let mut config = config.clone();
                    // 每个线程使用独立的随机数种子
                    config.run.seed = config.run.seed.map(|s| s.wrapping_add(index as u64));
                    let child = cli.child(index as usize)?;
                    let handle = thread::spawn(move || run_solve(config, &child));
                    handles.push(handle);
                }
                let mut elites = vec![];
                for handle in handles {
                    let history = handle.join().expect("求解线程崩溃")?;
                    elites.extend(history.last().map(|snapshot| snapshot.elite));
                }
                elites.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
                elites.iter().for_each(CommandLine::report_elite);
            }
        }
        Command::Encode { value } => {
            let cli_config = args.config.clone();
            let config = match cli_config {
                Some(path) => Config::load(&path)?,
                None => Config::default(),
            };
            let problem = config.problem;
            let codec = Codec::new(problem.lower_bound, problem.upper_bound, problem.precision)?;
            let steps = codec.explain(value)?;
            println!("区间 [{}, {}]，精度 {} 位小数", codec.lower(), codec.upper(), codec.precision());
            println!("量化点个数 {}，染色体长度 {}", codec.capacity(), codec.bits());
            println!("实数 {} → 量化 {}", steps.value, steps.quantized);
            println!("量化 {} → 整数 {}", steps.quantized, steps.index);
            println!("整数 {} → 二进制 {}", steps.index, steps.chromosome);
            println!("二进制 {} → 实数 {}（舍入前 {}）", steps.chromosome, steps.decoded, steps.raw);
        }
        Command::Validate => {
            let path = args.config.clone().unwrap_or("config.yaml".into());
            let config = Config::load(&path)?;
            let problem = &config.problem;
            let codec = Codec::new(problem.lower_bound, problem.upper_bound, problem.precision)?;
            print!("{}", config.to_yaml()?);
            println!("# 量化点个数 {}，染色体长度 {}", codec.capacity(), codec.bits());
        }
        Command::Serve { port } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(start_server(port))?;
        }
    }
    Ok(())
}
