//! 每一代的快照
//!

use crate::codec::Chromosome;
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

/// 至今为止适应度最高的个体
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Elite {
    pub value: f64,
    pub fitness: f64,
}

/// 一代种群评分的最小值、平均值、最大值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl GradeSummary {
    pub fn of(grades: &[f64]) -> Self {
        let (min, max) = match grades.iter().copied().minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => (f64::NAN, f64::NAN),
            MinMaxResult::OneElement(x) => (x, x),
            MinMaxResult::MinMax(min, max) => (min, max),
        };
        let avg = grades.iter().sum::<f64>() / grades.len() as f64;
        Self { min, avg, max }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochSnapshot {
    pub epoch: usize,
    pub values: Vec<f64>,
    pub chromosomes: Vec<Chromosome>,
    pub grades: Vec<f64>,
    pub fitnesses: Vec<f64>,
    pub elite: Elite,
    pub summary: GradeSummary,
}

/// 一条历史记录在表格中的一行
#[derive(Debug, Clone, Serialize)]
pub struct IndividualRecord {
    pub epoch: usize,
    pub index: usize,
    pub value: f64,
    pub chromosome: String,
    pub grade: f64,
    pub fitness: f64,
    pub elite: f64,
    pub elite_fitness: f64,
}

/// 每一代的统计量，可直接画成 fmin、favg、fmax 三条折线
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochSummary {
    pub epoch: usize,
    pub min: f64,
    pub avg: f64,
    pub max: f64,
    pub elite: f64,
    pub elite_fitness: f64,
}

impl EpochSnapshot {
    pub fn records(&self) -> impl Iterator<Item = IndividualRecord> + '_ {
        (0..self.values.len()).map(move |index| IndividualRecord {
            epoch: self.epoch,
            index,
            value: self.values[index],
            chromosome: self.chromosomes[index].to_string(),
            grade: self.grades[index],
            fitness: self.fitnesses[index],
            elite: self.elite.value,
            elite_fitness: self.elite.fitness,
        })
    }

    pub fn epoch_summary(&self) -> EpochSummary {
        EpochSummary {
            epoch: self.epoch,
            min: self.summary.min,
            avg: self.summary.avg,
            max: self.summary.max,
            elite: self.elite.value,
            elite_fitness: self.elite.fitness,
        }
    }
}
