use crate::Error;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;
use std::fs::read_to_string;
use std::path::Path;

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectiveConfig {
    /// F(x) = x mod (cos(20πx) - sin(x))
    Default,
    /// 系数按升幂排列
    Polynomial { coefficients: Vec<f64> },
    Sine {
        amplitude: Option<f64>,
        frequency: Option<f64>,
        phase: Option<f64>,
    },
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        Self::Default
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemConfig {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub precision: u8,
    #[serde(default)]
    pub objective: ObjectiveConfig,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            lower_bound: -2.0,
            upper_bound: 3.0,
            precision: 3,
            objective: ObjectiveConfig::Default,
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub population_size: usize,
    pub epochs: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    pub seed: Option<u64>,
}

/// 种群规模的上限
pub const MAX_POPULATION_SIZE: usize = 100_000;
/// 进化代数的上限
pub const MAX_EPOCHS: usize = 1_000_000;
/// 历史记录中个体总数的上限，即 N × (代数 + 1)
pub const MAX_RECORDS: usize = 5_000_000;

impl RunConfig {
    /// 检查种群规模和代数，保证历史记录能放进内存
    pub fn check_size(&self) -> Result<(), Error> {
        if self.population_size > MAX_POPULATION_SIZE {
            return Err(Error::RunTooLarge(format!(
                "种群规模 {} 超过 {MAX_POPULATION_SIZE}",
                self.population_size
            )));
        }
        if self.epochs > MAX_EPOCHS {
            return Err(Error::RunTooLarge(format!(
                "代数 {} 超过 {MAX_EPOCHS}",
                self.epochs
            )));
        }
        let records = self.population_size.saturating_mul(self.epochs + 1);
        if records > MAX_RECORDS {
            return Err(Error::RunTooLarge(format!(
                "历史记录共 {records} 个个体，超过 {MAX_RECORDS}"
            )));
        }
        Ok(())
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            epochs: 100,
            crossover_probability: 0.75,
            mutation_probability: 0.005,
            seed: None,
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub version: Option<String>,
    pub info: Option<BTreeMap<String, String>>,
    pub problem: ProblemConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        Self::from_yaml(&read_to_string(path)?)
    }

    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }
}
