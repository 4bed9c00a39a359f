//! 内置的目标函数
//!

use crate::config::ObjectiveConfig;
use crate::fitness::Objective;
use std::f64::consts::PI;

/// F(x) = x mod (cos(20πx) - sin(x))，余数与被除数同号
pub fn default_objective(x: f64) -> f64 {
    x % ((20.0 * PI * x).cos() - x.sin())
}

/// 用 Horner 法求多项式的值，系数按升幂排列
pub fn polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

pub fn build(config: &ObjectiveConfig) -> Objective {
    match config.clone() {
        ObjectiveConfig::Default => Box::new(default_objective),
        ObjectiveConfig::Polynomial { coefficients } => {
            Box::new(move |x| polynomial(&coefficients, x))
        }
        ObjectiveConfig::Sine {
            amplitude,
            frequency,
            phase,
        } => {
            let amplitude = amplitude.unwrap_or(1.0);
            let frequency = frequency.unwrap_or(1.0);
            let phase = phase.unwrap_or(0.0);
            Box::new(move |x| amplitude * (frequency * x + phase).sin())
        }
    }
}
