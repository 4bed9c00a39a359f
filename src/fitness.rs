//! 评分与适应度
//!
//! 评分就是目标函数值；适应度是评分平移后的正数，供轮盘赌选择使用。

use crate::codec::Codec;
use std::fmt;

/// 目标函数
pub type Objective = Box<dyn Fn(f64) -> f64 + Send + Sync>;

/// 适应度 = 评分 - fmin + ε，ε 恒为 1
pub const FITNESS_OFFSET: f64 = 1.0;

pub struct FitnessEngine {
    objective: Objective,
    fmin: f64,
}

impl fmt::Debug for FitnessEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FitnessEngine")
            .field("fmin", &self.fmin)
            .finish_non_exhaustive()
    }
}

impl FitnessEngine {
    /// 以 10^-d 为步长扫描区间上所有量化点，取最小评分作为 fmin
    pub fn new(codec: &Codec, objective: Objective) -> Self {
        let fmin = (0..codec.capacity())
            .map(|k| objective(codec.point(k)))
            .fold(f64::MAX, f64::min);
        Self { objective, fmin }
    }

    pub fn fmin(&self) -> f64 {
        self.fmin
    }

    pub fn grade(&self, x: f64) -> f64 {
        (self.objective)(x)
    }

    pub fn fitness_of_grade(&self, grade: f64) -> f64 {
        grade - self.fmin + FITNESS_OFFSET
    }

    pub fn fitness(&self, x: f64) -> f64 {
        self.fitness_of_grade(self.grade(x))
    }
}
