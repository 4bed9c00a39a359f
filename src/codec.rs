//! 实数、整数与二进制串之间的编码
//!
//! 区间 `[a, b]` 按精度 `d` 被划分为 `(b - a) · 10^d + 1` 个点，每个点对应一个整数下标，
//! 下标再以大端序写成长度为 `L` 的二进制串。`L` 是能容纳所有点的最短位数。

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// 判断 `(b - a) · 10^d` 是否为整数时允许的相对误差
const PARTITION_TOLERANCE: f64 = 1e-9;

/// 量化点个数的上限，创建适应度引擎时需要逐点求值
pub const MAX_POINTS: u64 = 10_000_001;

/// 一个个体的染色体，每一位取 0 或 1，最高位在前
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chromosome(Vec<u8>);

impl Chromosome {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bits(&self) -> &[u8] {
        &self.0
    }

    pub fn flip(&mut self, position: usize) {
        self.0[position] ^= 1;
    }

    /// 前 `cut` 位取自自身，其余取自 `other`
    pub fn splice(&self, other: &Chromosome, cut: usize) -> Chromosome {
        let mut bits = Vec::with_capacity(self.len());
        bits.extend_from_slice(&self.0[..cut]);
        bits.extend_from_slice(&other.0[cut..]);
        Chromosome(bits)
    }
}

impl From<Vec<u8>> for Chromosome {
    fn from(bits: Vec<u8>) -> Self {
        Self(bits.into_iter().map(|bit| (bit != 0) as u8).collect())
    }
}

impl Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.0 {
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Codec {
    lower: f64,
    upper: f64,
    precision: u8,
    scale: f64,
    capacity: u64,
    bits: usize,
}

impl Codec {
    pub fn new(lower: f64, upper: f64, precision: u8) -> Result<Self, Error> {
        if !(lower.is_finite() && upper.is_finite()) || lower > upper {
            return Err(Error::InvalidBounds { lower, upper });
        }
        if precision < 1 {
            return Err(Error::InvalidPrecision(format!(
                "小数位数 {precision} 必须至少为 1"
            )));
        }
        let scale = 10f64.powi(precision as i32);
        let steps = (upper - lower) * scale;
        if !steps.is_finite() || steps + 1.0 > MAX_POINTS as f64 {
            return Err(Error::InvalidPrecision(format!(
                "区间 [{lower}, {upper}] 在 {precision} 位小数下的点数超过 {MAX_POINTS}"
            )));
        }
        if (steps - steps.round()).abs() > PARTITION_TOLERANCE * steps.max(1.0) {
            return Err(Error::InvalidPrecision(format!(
                "区间 [{lower}, {upper}] 不能按 {precision} 位小数等分"
            )));
        }
        let capacity = steps.round() as u64 + 1;
        // 最短的 L 使得 2^L >= capacity
        let bits = (u64::BITS - (capacity - 1).leading_zeros()) as usize;
        Ok(Self {
            lower,
            upper,
            precision,
            scale,
            capacity,
            bits,
        })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// 区间内量化点的个数
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// 染色体长度 L
    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn contains(&self, x: f64) -> bool {
        self.lower <= x && x <= self.upper
    }

    /// 四舍五入到 d 位小数
    pub fn quantize(&self, x: f64) -> f64 {
        (x * self.scale).round() / self.scale
    }

    /// 第 k 个量化点
    pub fn point(&self, k: u64) -> f64 {
        self.quantize(self.lower + k as f64 / self.scale)
            .clamp(self.lower, self.upper)
    }

    fn max_index(&self) -> u64 {
        if self.bits == 0 {
            0
        } else {
            u64::MAX >> (u64::BITS as usize - self.bits)
        }
    }

    pub fn real_to_index(&self, x: f64) -> Result<u64, Error> {
        if !self.contains(x) {
            return Err(Error::ValueOutOfRange {
                value: x,
                lower: self.lower,
                upper: self.upper,
            });
        }
        let span = self.upper - self.lower;
        if span == 0.0 {
            return Ok(0);
        }
        let index = ((x - self.lower) * self.max_index() as f64 / span).round();
        Ok((index as u64).min(self.max_index()))
    }

    /// 不做舍入的解码结果
    pub fn index_to_raw_real(&self, index: u64) -> f64 {
        let max_index = self.max_index();
        if max_index == 0 {
            return self.lower;
        }
        self.lower + (self.upper - self.lower) * index as f64 / max_index as f64
    }

    pub fn index_to_real(&self, index: u64) -> f64 {
        self.quantize(self.index_to_raw_real(index))
            .clamp(self.lower, self.upper)
    }

    pub fn index_to_bits(&self, index: u64) -> Chromosome {
        let bits = (0..self.bits)
            .rev()
            .map(|position| ((index >> position) & 1) as u8)
            .collect();
        Chromosome(bits)
    }

    pub fn bits_to_index(&self, chromosome: &Chromosome) -> u64 {
        chromosome
            .bits()
            .iter()
            .rev()
            .enumerate()
            .take(u64::BITS as usize)
            .filter(|(_, &bit)| bit == 1)
            .fold(0, |index, (position, _)| index | (1 << position))
    }

    pub fn encode(&self, x: f64) -> Result<Chromosome, Error> {
        Ok(self.index_to_bits(self.real_to_index(x)?))
    }

    pub fn decode(&self, chromosome: &Chromosome) -> f64 {
        self.index_to_real(self.bits_to_index(chromosome))
    }
}

/// 一个实数从量化到编码再解码的每一步
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingSteps {
    pub value: f64,
    pub quantized: f64,
    pub index: u64,
    pub chromosome: Chromosome,
    pub raw: f64,
    pub decoded: f64,
}

impl Codec {
    pub fn explain(&self, value: f64) -> Result<EncodingSteps, Error> {
        let quantized = self.quantize(value);
        let index = self.real_to_index(quantized)?;
        let chromosome = self.index_to_bits(index);
        let decoded_index = self.bits_to_index(&chromosome);
        Ok(EncodingSteps {
            value,
            quantized,
            index,
            chromosome,
            raw: self.index_to_raw_real(decoded_index),
            decoded: self.index_to_real(decoded_index),
        })
    }
}
