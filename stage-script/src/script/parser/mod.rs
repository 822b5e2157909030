//! # Parser 模块
//!
//! 行式脚本解析器（手写字符串解析，无 regex 依赖）。
//!
//! ## 架构
//!
//! ```text
//! 原始文本 → [逐行切分] → [指令识别 + 增量状态补全] → Vec<Command>
//! ```
//!
//! ## 设计原则
//!
//! - 容错解析：任何无法识别或畸形的行降级为 `RawText`，原文保留，
//!   绝不抛出错误
//! - 增量状态：`setTransform` 只写出变化的字段，解析期用逐目标状态表
//!   把每条指令补全为完整变换
//! - 状态表是函数内的局部累加器，不存在模块级可变状态，可安全重入
//!
//! ## 模块结构
//!
//! - `helpers`: 辅助解析函数

mod helpers;


use std::collections::HashMap;
use std::str::FromStr;

use serde_json::Value;

use crate::command::{AnchorPreset, BG_TARGET, Command, Easing};
use crate::diagnostic::Diagnostic;
use crate::transform::{Transform, Vec2};

use helpers::{parse_duration, push_extra, split_key_value, split_params};

/// 解析整段脚本（便捷入口，丢弃诊断）
///
/// 需要诊断信息时使用 [`Parser`]。
pub fn parse_script(text: &str, scale_x: f64, scale_y: f64) -> Vec<Command> {
    Parser::new().parse(text, scale_x, scale_y)
}

/// 脚本解析器
pub struct Parser {
    /// 解析诊断（非致命问题）
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    /// 创建新的解析器
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    /// 解析脚本文本
    ///
    /// # 参数
    ///
    /// - `text`: 脚本文本，每行一条指令，行尾 `;` 可有可无
    /// - `scale_x` / `scale_y`: 脚本逻辑坐标到工作坐标的换算因子
    ///   （position 分量逐轴相乘）
    ///
    /// # 返回
    ///
    /// 有序的指令列表。解析不会失败：空白行被跳过，其余每个输入行
    /// 恰好产生一条指令，无法解析的行产生 `RawText`。
    pub fn parse(&mut self, text: &str, scale_x: f64, scale_y: f64) -> Vec<Command> {
        self.diagnostics.clear();

        let scale = Vec2::new(scale_x, scale_y);
        // 逐目标的最近已解析状态（局部累加器，不跨调用保留）
        let mut states: HashMap<String, Transform> = HashMap::new();
        let mut commands = Vec::new();

        for (line_idx, raw_line) in text.lines().enumerate() {
            let line_number = line_idx + 1;
            let trimmed = raw_line.trim();
            if trimmed.is_empty() {
                continue;
            }

            // 行尾的 `;` 是指令终结符；没有它的行同样处理
            // （对白等自由文本行会落入 RawText）
            let line = trimmed.strip_suffix(';').unwrap_or(trimmed);

            commands.push(self.parse_line(line, trimmed, line_number, scale, &mut states));
        }

        commands
    }

    /// 获取解析过程中收集的诊断
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// 解析单行
    fn parse_line(
        &mut self,
        line: &str,
        original: &str,
        line_number: usize,
        scale: Vec2,
        states: &mut HashMap<String, Transform>,
    ) -> Command {
        let (head, params) = split_params(line);

        if let Some(payload) = head.strip_prefix("setTransform:") {
            return self.parse_set_transform(payload, &params, original, line_number, scale, states);
        }
        if let Some(path) = head.strip_prefix("changeFigure:") {
            return self.parse_change_figure(path, &params, original, line_number, scale, states);
        }
        if let Some(path) = head.strip_prefix("changeBg:") {
            return self.parse_change_bg(path, &params, original, line_number, scale, states);
        }

        Command::RawText {
            text: original.to_string(),
        }
    }

    /// 解析 `setTransform:<json> -target=<id> -duration=<ms> [-ease=<name>] ...`
    fn parse_set_transform(
        &mut self,
        payload: &str,
        params: &[&str],
        original: &str,
        line_number: usize,
        scale: Vec2,
        states: &mut HashMap<String, Transform>,
    ) -> Command {
        let json = match serde_json::from_str::<Value>(payload.trim()) {
            Ok(v) => v,
            Err(e) => {
                return self.degrade(original, line_number, format!("transform JSON 解析失败: {e}"));
            }
        };

        let mut target: Option<String> = None;
        let mut duration_raw: Option<&str> = None;
        let mut easing = Easing::Unspecified;

        for param in params {
            let (key, value) = split_key_value(param);
            match key {
                "target" => target = value.map(str::to_string),
                "duration" => duration_raw = value,
                "ease" => {
                    easing = match value {
                        Some(name) if !name.is_empty() => Easing::Named(name.to_string()),
                        // `-ease=` 与裸 `-ease` 都表示采用默认缓动
                        _ => Easing::UseDefault,
                    };
                }
                // 其余参数（如 -next）不进入模型，导出时重新生成
                _ => {}
            }
        }

        let Some(target) = target.filter(|t| !t.is_empty()) else {
            return self.degrade(original, line_number, "setTransform 缺少 -target 参数");
        };

        let duration_ms = match duration_raw {
            None => 500,
            Some(raw) => parse_duration(Some(raw)).unwrap_or_else(|| {
                self.diagnostics.push(
                    Diagnostic::info(format!("duration 无法解析为整数，使用默认值 500: {raw:?}"))
                        .with_line(line_number),
                );
                500
            }),
        };

        // 增量合并：未出现的字段继承目标的最近状态
        let prior = states.get(&target).cloned().unwrap_or_default();
        let transform = prior.apply_payload(&json, scale);
        states.insert(target.clone(), transform.clone());

        Command::SetTransform {
            target,
            duration_ms,
            easing,
            transform,
        }
    }

    /// 解析 `changeFigure:<path> -id=<id> -transform=<json> [-k[=v]]* [-left|-right]`
    fn parse_change_figure(
        &mut self,
        path: &str,
        params: &[&str],
        original: &str,
        line_number: usize,
        scale: Vec2,
        states: &mut HashMap<String, Transform>,
    ) -> Command {
        let mut target: Option<String> = None;
        let mut anchor = AnchorPreset::default();
        let mut payload: Option<Value> = None;
        let mut extras: Vec<(String, String)> = Vec::new();

        for param in params {
            let bare = param.trim();

            // 裸预设位标记（`-left` 在 ` -` 切分后只剩 `left`）
            if let Ok(preset) = AnchorPreset::from_str(bare) {
                anchor = preset;
                continue;
            }

            let (key, value) = split_key_value(param);
            match (key, value) {
                ("transform", Some(json_str)) if !json_str.is_empty() => {
                    match serde_json::from_str::<Value>(json_str) {
                        Ok(v) => payload = Some(v),
                        Err(e) => {
                            return self.degrade(
                                original,
                                line_number,
                                format!("transform JSON 解析失败: {e}"),
                            );
                        }
                    }
                }
                ("transform", _) => {} // 空的 -transform 参数，忽略
                ("id", Some(id)) if !id.is_empty() => target = Some(id.to_string()),
                ("id", _) => {}
                (key, value) => push_extra(&mut extras, key, value.unwrap_or("")),
            }
        }

        // 整体替换语义：不与先前状态合并
        let transform = Transform::from_payload(&payload.unwrap_or(Value::Null), scale);
        let target = target.unwrap_or_else(|| "unknown".to_string());
        states.insert(target.clone(), transform.clone());

        Command::ChangeFigure {
            target,
            path: path.trim().to_string(),
            transform,
            anchor,
            extras,
        }
    }

    /// 解析 `changeBg:<path> -transform=<json> [-k[=v]]*`
    fn parse_change_bg(
        &mut self,
        path: &str,
        params: &[&str],
        original: &str,
        line_number: usize,
        scale: Vec2,
        states: &mut HashMap<String, Transform>,
    ) -> Command {
        let mut payload: Option<Value> = None;
        let mut extras: Vec<(String, String)> = Vec::new();

        for param in params {
            let (key, value) = split_key_value(param);
            match (key, value) {
                ("transform", Some(json_str)) if !json_str.is_empty() => {
                    match serde_json::from_str::<Value>(json_str) {
                        Ok(v) => payload = Some(v),
                        Err(e) => {
                            return self.degrade(
                                original,
                                line_number,
                                format!("transform JSON 解析失败: {e}"),
                            );
                        }
                    }
                }
                ("transform", _) => {}
                (key, value) => push_extra(&mut extras, key, value.unwrap_or("")),
            }
        }

        let transform = Transform::from_payload(&payload.unwrap_or(Value::Null), scale);
        states.insert(BG_TARGET.to_string(), transform.clone());

        Command::ChangeBackground {
            path: path.trim().to_string(),
            transform,
            extras,
        }
    }

    /// 降级为 RawText 并记录警告
    fn degrade(&mut self, original: &str, line_number: usize, message: impl Into<String>) -> Command {
        self.diagnostics.push(
            Diagnostic::warn(message)
                .with_line(line_number)
                .with_detail(original),
        );
        Command::RawText {
            text: original.to_string(),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
