use crate::snapshot::EpochSnapshot;
use thiserror::Error;

/// 错误类型
#[derive(Debug, Error)]
pub enum Error {
    #[error("区间 [{lower}, {upper}] 无效：下界大于上界或不是有限数")]
    InvalidBounds { lower: f64, upper: f64 },

    #[error("精度不足：{0}")]
    InvalidPrecision(String),

    #[error("取值 {value} 不在区间 [{lower}, {upper}] 内")]
    ValueOutOfRange { value: f64, lower: f64, upper: f64 },

    #[error("杂交概率 {0} 不在 (0.5, 1] 内")]
    InvalidCrossoverProbability(f64),

    #[error("变异概率 {0} 不在 (0, 0.01] 内")]
    InvalidMutationProbability(f64),

    #[error("进化参数过大：{0}")]
    RunTooLarge(String),

    #[error("选择缓存无效或种群为空")]
    StaleCache,

    #[error("读写文件失败：{0}")]
    Io(#[from] std::io::Error),

    #[error("配置解析错误：{0}")]
    Config(#[from] serde_yaml::Error),

    #[error("JSON 解析错误：{0}")]
    Json(#[from] serde_json::Error),

    #[error("表格读写错误：{0}")]
    Csv(#[from] csv::Error),
}

/// 求解中途失败时，带上已经完成的历史记录
#[derive(Debug, Error)]
#[error("第 {epoch} 代求解失败：{source}")]
pub struct RunError {
    pub epoch: usize,
    #[source]
    pub source: Error,
    pub history: Vec<EpochSnapshot>,
}
