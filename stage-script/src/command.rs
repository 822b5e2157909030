//! # Command 模块
//!
//! 定义脚本指令的类型化表示。Command 是解析器的输出，也是合并器与
//! 序列化器之间的**唯一数据载体**。
//!
//! ## 设计原则
//!
//! - **纯数据**：Command 本身不执行任何操作
//! - **阶段间不可变**：每个处理阶段产出新值，从不就地修改
//! - **无损**：无法识别的行保留为 [`Command::RawText`]，原文重新输出

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::transform::Transform;

/// 保留的背景实体 id
pub const BG_TARGET: &str = "bg-main";

/// 缓动设置（三态）
///
/// `setTransform` 的 `-ease` 参数是一个真正的三值域，
/// 不能折叠为 `Option<String>`：
///
/// - [`Unspecified`]：脚本未写 `-ease`，导出时**永不**补一个
/// - [`UseDefault`]：脚本写了空的 `-ease=`，导出时采用调用方给的默认缓动
/// - [`Named`]：脚本显式指定了缓动名
///
/// [`Unspecified`]: Easing::Unspecified
/// [`UseDefault`]: Easing::UseDefault
/// [`Named`]: Easing::Named
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// 未指定（导出时不产生 `-ease` 子句）
    #[default]
    Unspecified,
    /// 使用调用方提供的默认缓动
    UseDefault,
    /// 显式命名的缓动函数
    Named(String),
}

impl Easing {
    /// 缓动名（仅 [`Easing::Named`] 有值）
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            _ => None,
        }
    }
}

/// 预设水平锚点
///
/// `changeFigure` 行上的裸 `-left` / `-center` / `-right` 标记，
/// 决定立绘位置偏移前的基准位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnchorPreset {
    /// 左侧
    Left,
    /// 中央（默认，导出时不产生后缀）
    #[default]
    Center,
    /// 右侧
    Right,
}

impl AnchorPreset {
    /// 脚本中的标记文本
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl FromStr for AnchorPreset {
    type Err = ();

    /// 从脚本标记解析锚点（线格式大小写敏感）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(()),
        }
    }
}

/// 脚本指令
///
/// 指令序列的顺序是有意义的，必须经合并与序列化原样保持。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// 对目标实体施加变换动画
    SetTransform {
        /// 目标实体 id
        target: String,
        /// 动画时长（毫秒）
        duration_ms: u32,
        /// 缓动设置
        easing: Easing,
        /// 完整解析后的变换（增量已在解析期补全）
        transform: Transform,
    },

    /// 切换/创建立绘
    ChangeFigure {
        /// 目标实体 id
        target: String,
        /// 素材路径
        path: String,
        /// 变换（整体替换语义）
        transform: Transform,
        /// 预设水平锚点
        anchor: AnchorPreset,
        /// 附加参数（有序；空值表示裸标志如 `-next`）
        extras: Vec<(String, String)>,
    },

    /// 切换背景（目标隐含为 [`BG_TARGET`]）
    ChangeBackground {
        /// 素材路径
        path: String,
        /// 变换（整体替换语义）
        transform: Transform,
        /// 附加参数（有序）
        extras: Vec<(String, String)>,
    },

    /// 无法识别的行，原文保留
    RawText {
        /// 原始行文本（导出时逐字重新输出）
        text: String,
    },
}

impl Command {
    /// 指令的目标实体 id（`RawText` 无目标）
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::SetTransform { target, .. } | Self::ChangeFigure { target, .. } => Some(target),
            Self::ChangeBackground { .. } => Some(BG_TARGET),
            Self::RawText { .. } => None,
        }
    }

    /// 指令携带的变换（`RawText` 无变换）
    pub fn transform(&self) -> Option<&Transform> {
        match self {
            Self::SetTransform { transform, .. }
            | Self::ChangeFigure { transform, .. }
            | Self::ChangeBackground { transform, .. } => Some(transform),
            Self::RawText { .. } => None,
        }
    }

    /// 是否为原文保留行
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::RawText { .. })
    }
}
