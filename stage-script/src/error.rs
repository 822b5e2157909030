//! # Error 模块
//!
//! 定义 stage-script 中使用的错误类型。
//!
//! 解析与合并按设计不会失败（畸形输入降级为 [`Command::RawText`] 并记录诊断，
//! 见 `diagnostic` 模块）；唯一面向调用方的错误是导出配置校验。
//!
//! [`Command::RawText`]: crate::command::Command::RawText

use thiserror::Error;

/// 导出配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    /// 画布尺寸无效
    #[error("画布尺寸无效: {width} x {height}（必须为正数）")]
    InvalidCanvasSize { width: f64, height: f64 },

    /// 逻辑分辨率无效
    #[error("逻辑分辨率无效: {width} x {height}（必须为正数）")]
    InvalidBaseSize { width: f64, height: f64 },
}
