use evolalg::config::{Config, ObjectiveConfig};
use evolalg::export::{write_history, write_summary, SolveReport};
use evolalg::interfaces::command_line::{Command, CommandLine, CommandLineArgs};
use evolalg::objectives::{build, default_objective, polynomial};
use evolalg::server::{self, ApiResponse, EncodeQuery, SolveQuery};
use evolalg::Solver;
use axum::extract::Query;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::PI;
use std::fs::{read_to_string, remove_dir_all};

const CONFIG: &str = r#"
version: "1.0"
info:
  name: 抛物线
problem:
  lower_bound: -2
  upper_bound: 3
  precision: 2
  objective:
    type: polynomial
    coefficients: [0, 2, -1]
run:
  population_size: 20
  epochs: 15
  seed: 99
"#;

#[test]
fn parse_config() {
    let config = Config::from_yaml(CONFIG).unwrap();
    assert_eq!(config.problem.lower_bound, -2.0);
    assert_eq!(config.problem.precision, 2);
    assert_eq!(
        config.problem.objective,
        ObjectiveConfig::Polynomial {
            coefficients: vec![0.0, 2.0, -1.0]
        }
    );
    assert_eq!(config.run.population_size, 20);
    assert_eq!(config.run.seed, Some(99));
    // 未给出的字段取默认值
    assert_eq!(config.run.crossover_probability, 0.75);
    assert_eq!(config.run.mutation_probability, 0.005);

    let again = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(again, config);
}

#[test]
fn objective_defaults_to_builtin() {
    let config = Config::from_yaml("problem: { lower_bound: 0, upper_bound: 1, precision: 1 }").unwrap();
    assert_eq!(config.problem.objective, ObjectiveConfig::Default);
    assert!(Config::from_yaml("problem: { lower_bound: 0, upper_bound: 1, precision: 1, objective: { type: cubic } }").is_err());
}

#[test]
fn builtin_objectives() {
    assert_eq!(default_objective(0.0), 0.0);
    let x = 0.3;
    let expected = x % ((20.0 * PI * x).cos() - x.sin());
    assert_eq!(default_objective(x), expected);
    assert_eq!(polynomial(&[1.0, -3.0, 2.0], 2.0), 3.0);
    assert_eq!(polynomial(&[], 5.0), 0.0);

    let sine = build(&ObjectiveConfig::Sine {
        amplitude: Some(2.0),
        frequency: None,
        phase: None,
    });
    assert!((sine(PI / 2.0) - 2.0).abs() < 1e-12);
    let parabola = build(&ObjectiveConfig::Polynomial {
        coefficients: vec![0.0, 2.0, -1.0],
    });
    assert_eq!(parabola(1.0), 1.0);
}

#[test]
fn solve_from_config_is_reproducible() {
    let config = Config::from_yaml(CONFIG).unwrap();
    let first = Solver::from_config(&config.problem, config.run.seed)
        .unwrap()
        .solve(20, 15, 0.75, 0.005)
        .unwrap();
    let second = Solver::from_config(&config.problem, config.run.seed)
        .unwrap()
        .solve(20, 15, 0.75, 0.005)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn export_tables() {
    let mut solver = Solver::with_rng(-2.0, 3.0, 3, default_objective, StdRng::seed_from_u64(5)).unwrap();
    let history = solver.solve(6, 4, 0.75, 0.005).unwrap();

    let mut buffer = vec![];
    write_history(&mut buffer, &history).unwrap();
    let table = String::from_utf8(buffer).unwrap();
    let mut lines = table.lines();
    assert_eq!(
        lines.next(),
        Some("epoch,index,value,chromosome,grade,fitness,elite,elite_fitness")
    );
    assert_eq!(lines.count(), 5 * 6);

    let mut buffer = vec![];
    write_summary(&mut buffer, &history).unwrap();
    let table = String::from_utf8(buffer).unwrap();
    let mut lines = table.lines();
    assert_eq!(lines.next(), Some("epoch,min,avg,max,elite,elite_fitness"));
    assert_eq!(lines.count(), 5);

    let report = SolveReport::new(history.clone());
    assert_eq!(report.series.len(), 5);
    assert_eq!(report.elite, Some(history[4].elite));
}

#[test]
fn command_line_writes_results() {
    let output_dir = std::env::temp_dir().join("evolalg-command-line-test");
    let args = CommandLineArgs {
        command: Command::Solve {
            threads: None,
            seed: Some(1),
            interval: Some(5),
        },
        config: None,
    };
    let cli = CommandLine::new(args, Some(output_dir.clone())).unwrap();
    assert!(!cli.threaded);
    assert_eq!(cli.interval, 5);

    let config = Config::from_yaml(CONFIG).unwrap();
    let mut solver = Solver::from_config(&config.problem, config.run.seed).unwrap();
    let history = solver.solve_with(&config.run, &cli).unwrap();
    cli.write_results(&history).unwrap();

    let summary = read_to_string(output_dir.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 1 + 16);
    let elite = read_to_string(output_dir.join("summary.yaml")).unwrap();
    assert!(elite.contains("fitness"));
    remove_dir_all(output_dir).unwrap();
}

#[tokio::test]
async fn server_solves_query() {
    let query = SolveQuery {
        population_size: 10,
        a: -2.0,
        b: 3.0,
        d: 3,
        crossover_probability: 0.75,
        mutation_probability: 0.005,
        epochs: 5,
        seed: Some(3),
    };
    match server::solve(query.into()).await {
        ApiResponse::Success { result } => {
            assert_eq!(result.history.len(), 6);
            assert_eq!(result.series.len(), 6);
        }
        ApiResponse::Error { error } => panic!("{error}"),
    }
}

#[tokio::test]
async fn server_reports_errors() {
    let mut config = Config::default();
    config.run.crossover_probability = 0.2;
    let response = server::solve(config).await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["type"], "error");
    assert!(json["error"].as_str().unwrap().contains("0.2"));
}

#[tokio::test]
async fn server_rejects_oversized_requests() {
    let query = SolveQuery {
        population_size: 10,
        a: -2.0,
        b: 3.0,
        d: 3,
        crossover_probability: 0.2,
        mutation_probability: 0.005,
        epochs: 10_000_000_000,
        seed: Some(3),
    };
    let response = server::solve(query.clone().into()).await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["type"], "error");
    assert!(json["error"].as_str().unwrap().contains("10000000000"));

    let fine_grid = SolveQuery {
        a: 0.0,
        b: 1.0,
        d: 15,
        epochs: 5,
        crossover_probability: 0.75,
        ..query
    };
    let json = serde_json::to_value(server::solve(fine_grid.into()).await).unwrap();
    assert_eq!(json["type"], "error");
}

#[test]
fn solve_needs_at_least_one_thread() {
    assert!(CommandLineArgs::try_parse_from(["evolalg", "solve", "--threads", "0"]).is_err());
    let args = CommandLineArgs::try_parse_from(["evolalg", "config.yaml", "solve", "-t", "2"]).unwrap();
    assert!(matches!(args.command, Command::Solve { threads: Some(2), .. }));
}

#[tokio::test]
async fn server_explains_encoding() {
    let query = EncodeQuery {
        a: -2.0,
        b: 3.0,
        d: 3,
        x: -1.234,
    };
    let response = server::encode(Query(query)).await.0;
    match response {
        ApiResponse::Success { result } => {
            assert_eq!(result.index, 1255);
            assert_eq!(result.chromosome.to_string(), "0010011100111");
        }
        ApiResponse::Error { error } => panic!("{error}"),
    }
}

#[test]
fn query_names_follow_form_fields() {
    let query: SolveQuery =
        serde_json::from_str(r#"{"N": 30, "a": -1, "b": 2, "d": 2, "Pk": 0.8, "Pm": 0.01, "epoki": 40}"#)
            .unwrap();
    let config = Config::from(query);
    assert_eq!(config.run.population_size, 30);
    assert_eq!(config.run.epochs, 40);
    assert_eq!(config.run.crossover_probability, 0.8);
    assert_eq!(config.problem.precision, 2);
    assert_eq!(config.run.seed, None);
}
