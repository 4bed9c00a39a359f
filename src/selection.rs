//! 轮盘赌选择
//!
//! 选择的结果保存在 [`SelectionCache`] 中。种群一旦被杂交或变异改写，缓存即失效，
//! 必须重新选择。

use crate::codec::Codec;
use crate::fitness::FitnessEngine;
use crate::Error;
use serde::{Deserialize, Serialize};

/// 一次选择得到的各项数据，下标与种群一一对应
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionCache {
    pub grades: Vec<f64>,
    pub fitnesses: Vec<f64>,
    pub probabilities: Vec<f64>,
    /// 累积分布函数在每个下标处的上界
    pub cdf_upper_bounds: Vec<f64>,
    pub fitness_sum: f64,
}

impl SelectionCache {
    pub fn len(&self) -> usize {
        self.grades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grades.is_empty()
    }

    /// 第 i 个个体能否参与杂交
    pub fn is_selected(&self, i: usize, crossover_probability: f64) -> bool {
        self.cdf_upper_bounds[i] <= crossover_probability
    }
}

/// 对一组实数求评分、适应度、概率和累积分布。任一取值越界时直接返回错误，不计算任何东西。
pub fn select(
    codec: &Codec,
    engine: &FitnessEngine,
    values: &[f64],
) -> Result<SelectionCache, Error> {
    if let Some(&value) = values.iter().find(|&&x| !codec.contains(x)) {
        return Err(Error::ValueOutOfRange {
            value,
            lower: codec.lower(),
            upper: codec.upper(),
        });
    }
    let grades: Vec<f64> = values.iter().map(|&x| engine.grade(x)).collect();
    let fitnesses: Vec<f64> = grades
        .iter()
        .map(|&grade| engine.fitness_of_grade(grade))
        .collect();
    let fitness_sum: f64 = fitnesses.iter().sum();
    let probabilities: Vec<f64> = fitnesses.iter().map(|f| f / fitness_sum).collect();
    let cdf_upper_bounds = probabilities
        .iter()
        .scan(0.0, |bound, p| {
            *bound += p;
            Some(*bound)
        })
        .collect();
    Ok(SelectionCache {
        grades,
        fitnesses,
        probabilities,
        cdf_upper_bounds,
        fitness_sum,
    })
}
