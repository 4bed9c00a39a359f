//! 遗传算子：单点杂交与逐位变异
//!

pub mod crossover;
pub mod mutation;

pub use crossover::{crossover, CrossoverOutcome};
pub use mutation::{mutate, Mutations};
