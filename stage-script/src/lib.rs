//! # Stage Script
//!
//! WebGAL 舞台变换脚本的核心处理库。
//!
//! ## 架构概述
//!
//! `stage-script` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 它把行式脚本文本与类型化指令序列互相转换，并维护逐实体的
//! 增量变换状态：
//!
//! ```text
//! 脚本文本 ──parse──► Vec<Command> ──reconcile──► 整理序列 + 最终状态
//!     ▲                   │                           │
//!     │                   ├──build_animation_sequence─► 动画段（预览）
//!     └──────export───────┘
//! ```
//!
//! 脚本里的 `setTransform` 只写出变化的字段；解析器在读取时用
//! 逐目标状态表把每条指令补全为完整变换，因此下游永远拿到
//! 位置/缩放/旋转齐全的状态。无法识别的行降级为 `RawText`，
//! 原文保留并在导出时逐字还原——任何输入都不会导致解析失败。
//!
//! ## 核心类型
//!
//! - [`Command`]：一条脚本指令（解析输出 / 序列化输入）
//! - [`Transform`]：实体的完整变换状态（结构字段 + 开放滤镜参数）
//! - [`Easing`]：`-ease` 参数的三态建模
//! - [`ExportConfig`]：导出几何与默认缓动
//! - [`Diagnostic`]：解析/整理过程中收集的非致命问题
//!
//! ## 使用示例
//!
//! ```ignore
//! use stage_script::{ExportConfig, Parser, export_script, reconcile};
//!
//! let mut parser = Parser::new();
//! let commands = parser.parse(script_text, 1600.0 / 2560.0, 900.0 / 1440.0);
//! for diag in parser.diagnostics() {
//!     eprintln!("{diag}");
//! }
//!
//! let result = reconcile(&commands);
//! // result.final_states 驱动渲染端的静态视图
//!
//! let config = ExportConfig::new(500, 1600.0, 900.0, 2560.0, 1440.0)?;
//! let text = export_script(&result.commands, &config);
//! ```
//!
//! ## 模块结构
//!
//! - [`command`]：指令模型
//! - [`transform`]：变换状态与载荷合并规则
//! - [`script`]：脚本解析
//! - [`reconcile`]：状态整理
//! - [`animation`]：动画段派生与采样
//! - [`export`]：脚本序列化
//! - [`diagnostic`]：诊断条目
//! - [`error`]：错误类型

pub mod animation;
pub mod command;
pub mod diagnostic;
pub mod error;
pub mod export;
pub mod reconcile;
pub mod script;
pub mod transform;

// 重导出核心类型
pub use animation::{AnimationSegment, EasingCurve, build_animation_sequence};
pub use command::{AnchorPreset, BG_TARGET, Command, Easing};
pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use error::ExportError;
pub use export::{ExportConfig, export_script};
pub use reconcile::{ReconcileResult, reconcile};
pub use script::{Parser, parse_script};
pub use transform::{Transform, Vec2};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        // 验证所有公共类型都可以正常使用
        let commands = parse_script("changeBg:bg.png;", 1.0, 1.0);
        assert_eq!(commands.len(), 1);

        let result = reconcile(&commands);
        assert!(result.diagnostics.is_empty());

        let segments = build_animation_sequence(&commands);
        assert!(segments.is_empty());

        let config = ExportConfig::new(500, 1600.0, 900.0, 2560.0, 1440.0)
            .unwrap()
            .with_default_easing("easeInOut");
        let text = export_script(&commands, &config);
        assert!(text.starts_with("changeBg:bg.png"));
    }
}
