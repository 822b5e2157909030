//! # Export 模块
//!
//! 把指令序列重新序列化为脚本文本。
//!
//! ## 设计说明
//!
//! - 坐标换算与解析方向互逆：解析把脚本逻辑坐标乘以
//!   `canvas / base` 进入工作坐标，导出乘以 `base / canvas` 还原
//! - 所有 `setTransform` 的时长统一为调用方给定的导出时长
//!   （重导出即归一化时间轴）
//! - 数值舍入：颜色/bevel 整数通道取最近整数，其余保留两位小数
//! - `RawText` 原文逐字输出，不追加终结符

use crate::command::{AnchorPreset, Command, Easing};
use crate::error::ExportError;
use crate::transform::Vec2;

/// 导出配置
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// 导出的统一动画时长（毫秒）
    pub duration_ms: u32,
    /// 工作画布宽度
    pub canvas_width: f64,
    /// 工作画布高度
    pub canvas_height: f64,
    /// 脚本逻辑分辨率宽度
    pub base_width: f64,
    /// 脚本逻辑分辨率高度
    pub base_height: f64,
    /// 默认缓动名（供 `Easing::UseDefault` 的指令使用）
    pub default_easing: Option<String>,
}

impl ExportConfig {
    /// 创建导出配置
    ///
    /// 画布与逻辑分辨率都必须为正数（坐标换算要做除法）。
    pub fn new(
        duration_ms: u32,
        canvas_width: f64,
        canvas_height: f64,
        base_width: f64,
        base_height: f64,
    ) -> Result<Self, ExportError> {
        if !(canvas_width > 0.0 && canvas_height > 0.0) {
            return Err(ExportError::InvalidCanvasSize {
                width: canvas_width,
                height: canvas_height,
            });
        }
        if !(base_width > 0.0 && base_height > 0.0) {
            return Err(ExportError::InvalidBaseSize {
                width: base_width,
                height: base_height,
            });
        }

        Ok(Self {
            duration_ms,
            canvas_width,
            canvas_height,
            base_width,
            base_height,
            default_easing: None,
        })
    }

    /// 设置默认缓动名
    pub fn with_default_easing(mut self, easing: impl Into<String>) -> Self {
        self.default_easing = Some(easing.into());
        self
    }

    /// 工作坐标 → 脚本逻辑坐标的换算比
    fn scale_ratio(&self) -> Vec2 {
        Vec2::new(
            self.base_width / self.canvas_width,
            self.base_height / self.canvas_height,
        )
    }
}

/// 把指令序列序列化为脚本文本
///
/// 每条指令一行，指令行以 `;` 结尾；`RawText` 行原样输出。
pub fn export_script(commands: &[Command], config: &ExportConfig) -> String {
    commands
        .iter()
        .map(|command| export_command(command, config))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 序列化单条指令
fn export_command(command: &Command, config: &ExportConfig) -> String {
    let ratio = config.scale_ratio();

    match command {
        Command::SetTransform {
            target,
            easing,
            transform,
            ..
        } => {
            let json = transform.to_payload(ratio);
            format!(
                "setTransform:{json} -target={target} -duration={}{} -next;",
                config.duration_ms,
                ease_clause(easing, config),
            )
        }

        Command::ChangeFigure {
            target,
            path,
            transform,
            anchor,
            extras,
        } => {
            let json = transform.to_payload(ratio);
            let mut line = format!("changeFigure:{path} -id={target} -transform={json}");
            for (key, value) in extras {
                // 空值参数输出成裸 `-key`
                if value.is_empty() {
                    line.push_str(&format!(" -{key}"));
                } else {
                    line.push_str(&format!(" -{key}={value}"));
                }
            }
            if *anchor != AnchorPreset::Center {
                line.push_str(&format!(" -{}", anchor.as_str()));
            }
            line.push(';');
            line
        }

        Command::ChangeBackground {
            path,
            transform,
            extras,
        } => {
            let json = transform.to_payload(ratio);
            let mut line = format!("changeBg:{path} -transform={json}");
            for (key, value) in extras {
                line.push_str(&format!(" -{key}={value}"));
            }
            line.push(';');
            line
        }

        Command::RawText { text } => text.clone(),
    }
}

/// `-ease` 子句的三态产生规则
///
/// - `Unspecified`：永不产生，即使提供了默认缓动
/// - `UseDefault`：默认缓动存在、非空且不是哨兵值 `"default"` 时产生
/// - `Named`：名字非空时产生
fn ease_clause(easing: &Easing, config: &ExportConfig) -> String {
    let name = match easing {
        Easing::Unspecified => None,
        Easing::UseDefault => config
            .default_easing
            .as_deref()
            .filter(|d| !d.is_empty() && *d != "default"),
        Easing::Named(name) => Some(name.as_str()).filter(|n| !n.is_empty()),
    };

    name.map(|n| format!(" -ease={n}")).unwrap_or_default()
}
