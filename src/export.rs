//! 求解历史的导出：表格和汇总
//!

use crate::snapshot::{Elite, EpochSnapshot, EpochSummary};
use crate::Error;
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;

/// 一次求解的完整报告，供 HTTP 接口和图形界面使用
#[derive(Debug, Clone, Serialize)]
pub struct SolveReport {
    pub history: Vec<EpochSnapshot>,
    pub series: Vec<EpochSummary>,
    pub elite: Option<Elite>,
}

impl SolveReport {
    pub fn new(history: Vec<EpochSnapshot>) -> Self {
        let series = history.iter().map(EpochSnapshot::epoch_summary).collect();
        let elite = history.last().map(|snapshot| snapshot.elite);
        Self {
            history,
            series,
            elite,
        }
    }
}

/// 每个个体每一代一行
pub fn write_history<W: Write>(writer: W, history: &[EpochSnapshot]) -> Result<(), Error> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in history.iter().flat_map(EpochSnapshot::records) {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// 每一代一行：最小、平均、最大评分以及精英
pub fn write_summary<W: Write>(writer: W, history: &[EpochSnapshot]) -> Result<(), Error> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for snapshot in history {
        writer.serialize(snapshot.epoch_summary())?;
    }
    writer.flush()?;
    Ok(())
}
