use crate::config::Config;
use crate::export::{write_history, write_summary};
use crate::interfaces::{Interface, Message};
use crate::snapshot::{Elite, EpochSnapshot};
use crate::Error;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs::{create_dir_all, write, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// 命令行参数的定义
#[derive(Parser, Clone)]
#[command(name = "evolalg")]
#[command(author, version, about, long_about)]
#[command(propagate_version = true)]
pub struct CommandLineArgs {
    #[command(subcommand)]
    pub command: Command,
    /// 配置文件，默认为 config.yaml
    pub config: Option<PathBuf>,
}

/// 命令行中所有可用的子命令
#[derive(Subcommand, Clone)]
pub enum Command {
    /// 按配置文件求解，并把每一代的记录写入输出目录
    Solve {
        /// 线程数，默认为 1；多线程时每个线程独立求解
        #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
        threads: Option<u16>,
        /// 随机数种子，覆盖配置文件中的设置
        #[arg(short, long)]
        seed: Option<u64>,
        /// 每隔多少代报告一次进度，默认为 10
        #[arg(short, long)]
        interval: Option<usize>,
    },
    /// 展示一个实数的量化、编码和解码过程
    Encode {
        #[arg(allow_hyphen_values = true)]
        value: f64,
    },
    /// 检查配置文件并输出规范化后的结果
    Validate,
    /// 启动 HTTP 服务
    Serve {
        /// 端口，默认为 8081
        #[arg(short, long, default_value_t = 8081)]
        port: u16,
    },
}

/// 通过命令行来使用 evolalg 的入口，实现了界面特征
pub struct CommandLine {
    pub args: CommandLineArgs,
    pub output_dir: PathBuf,
    pub threaded: bool,
    pub interval: usize,
}

impl CommandLine {
    pub fn new(args: CommandLineArgs, maybe_output_dir: Option<PathBuf>) -> Result<Self, Error> {
        let output_dir = maybe_output_dir.unwrap_or_else(|| {
            let time = Local::now().format("%m-%d+%H_%M_%S").to_string();
            PathBuf::from(format!("output-{time}"))
        });
        create_dir_all(&output_dir)?;
        let (threaded, interval) = match &args.command {
            Command::Solve {
                threads, interval, ..
            } => (threads.is_some_and(|n| n > 1), interval.unwrap_or(10)),
            _ => (false, 10),
        };
        Ok(Self {
            args,
            output_dir,
            threaded,
            interval: interval.max(1),
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.args
            .config
            .clone()
            .unwrap_or(PathBuf::from("config.yaml"))
    }

    /// 配置文件不存在时使用默认配置
    pub fn load_config(&self) -> Result<Config, Error> {
        let path = self.config_path();
        if path.exists() {
            Config::load(&path)
        } else {
            println!("配置文件 {} 不存在，使用默认配置", path.display());
            Ok(Config::default())
        }
    }

    pub fn write_results(&self, history: &[EpochSnapshot]) -> Result<(), Error> {
        let history_path = self.output_dir.join("history.csv");
        write_history(File::create(&history_path)?, history)?;
        let summary_path = self.output_dir.join("summary.csv");
        write_summary(File::create(&summary_path)?, history)?;
        if let Some(last) = history.last() {
            let elite_path = self.output_dir.join("summary.yaml");
            write(&elite_path, serde_yaml::to_string(&last.elite)?)?;
        }
        println!(
            "已完成求解，结果保存在 {} 中",
            self.output_dir.display()
        );
        Ok(())
    }

    pub fn report_elite(elite: &Elite) {
        println!("最优解 x = {}，适应度为 {}", elite.value, elite.fitness);
    }

    pub fn child(&self, index: usize) -> Result<CommandLine, Error> {
        let child_dir = self.output_dir.join(format!("{index}"));
        let mut child = CommandLine::new(self.args.clone(), Some(child_dir))?;
        child.threaded = self.threaded;
        Ok(child)
    }
}

impl Interface for CommandLine {
    fn post(&self, message: Message) {
        let mut writer: Box<dyn Write> = if self.threaded {
            let log_path = self.output_dir.join("log.txt");
            let file = OpenOptions::new()
                .create(true) // 如果文件不存在，则创建
                .append(true) // 追加写入，不覆盖原有内容
                .open(log_path)
                .expect("Failed to open file");
            Box::new(file)
        } else {
            Box::new(std::io::stdout())
        };
        let result = match message {
            Message::Progress {
                epoch,
                summary,
                elite,
            } => {
                if epoch % self.interval != 0 {
                    return;
                }
                writeln!(
                    &mut writer,
                    "第 {epoch} 代：fmin = {:.6}，favg = {:.6}，fmax = {:.6}，精英 x = {}",
                    summary.min, summary.avg, summary.max, elite.value
                )
            }
            Message::BetterSolution { epoch, elite } => writeln!(
                &mut writer,
                "{} 第 {epoch} 代找到了更好的解 x = {}，适应度为 {:.6}",
                Local::now().format("%H:%M:%S"),
                elite.value,
                elite.fitness
            ),
            Message::Elapsed { time } => writeln!(&mut writer, "计算一代用时：{time} μs"),
            Message::Finished { epochs, elite } => writeln!(
                &mut writer,
                "共进化 {epochs} 代，最优解 x = {}，适应度为 {:.6}",
                elite.value, elite.fitness
            ),
        };
        result.unwrap()
    }
}
