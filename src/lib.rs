//! evolalg 是使用 Rust 实现的二进制编码遗传算法，用于在闭区间 `[a, b]` 上求一元函数的最大值。
//! 它同时发布为一个 Rust crate 和一个 NPM 模块。
//!
//! 区间按给定的小数位数量化，每个量化点编码为定长的二进制染色体。求解器使用轮盘赌选择、
//! 单点杂交、逐位变异和精英保留，并记录每一代的统计数据。
//!
//! evolalg 同名的命令行程序可以读取配置文件求解、展示编码过程，或者启动一个 HTTP 服务。

pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod fitness;
pub mod interfaces;
pub mod objectives;
pub mod operators;
pub mod selection;
pub mod server;
pub mod snapshot;
pub mod solver;

pub use codec::{Chromosome, Codec};
pub use error::{Error, RunError};
pub use solver::Solver;
