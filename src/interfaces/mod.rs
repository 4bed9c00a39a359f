use crate::snapshot::{Elite, GradeSummary};
use serde::Serialize;

pub mod command_line;
pub mod web;

/// 向用户反馈的消息类型
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Progress {
        epoch: usize,
        summary: GradeSummary,
        elite: Elite,
    },
    BetterSolution {
        epoch: usize,
        elite: Elite,
    },
    Elapsed {
        time: u64,
    },
    Finished {
        epochs: usize,
        elite: Elite,
    },
}

/// 定义了向用户报告消息的接口，用于统一命令行和图形界面的输出方式
///
/// 命令行界面、图形界面只需要各自实现 post 方法，就可向用户报告各种用户数据
pub trait Interface {
    fn post(&self, message: Message);
}

/// 什么也不报告
pub struct Silent;

impl Interface for Silent {
    fn post(&self, _message: Message) {}
}
