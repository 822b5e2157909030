//! # 合并模块
//!
//! 对指令序列做单趟左到右的状态整理：
//!
//! - 把每个实体的多条 `setTransform` 逐条补全为该时点的完整状态
//!   （指令本身保留，供渲染端计算中间动画帧）
//! - 旁路产出逐实体的最终状态表，驱动渲染端的静态视图
//!
//! ## 设计原则
//!
//! - 指令顺序原样保持，任何条目都不会被删除或重排
//! - 背景实体与空目标的指令原样透传，不参与整理
//! - 没有致命错误：缺失基线合成默认状态并记录诊断

use std::collections::HashMap;

use crate::command::{BG_TARGET, Command};
use crate::diagnostic::Diagnostic;
use crate::transform::Transform;

/// 合并结果
#[derive(Debug, Clone, Default)]
pub struct ReconcileResult {
    /// 整理后的指令序列（与输入等长、同序）
    pub commands: Vec<Command>,
    /// 逐实体的最终解析状态（不含背景实体）
    pub final_states: HashMap<String, Transform>,
    /// 整理过程中收集的诊断
    pub diagnostics: Vec<Diagnostic>,
}

/// 整理指令序列
///
/// 单趟左到右处理。对每个非背景目标：
///
/// - `setTransform` 的变换深合并到该目标的运行状态上
///   （结构字段覆盖、滤镜参数取并集），输出的条目携带合并后的完整变换
/// - `changeFigure` / `changeBg` 把运行状态重置为其自身变换，条目原样输出
/// - 尚无基线（先行 `changeFigure`）的 `setTransform` 合成默认基线并告警
pub fn reconcile(commands: &[Command]) -> ReconcileResult {
    let mut result = ReconcileResult::default();
    // 逐目标运行状态（局部累加器）
    let mut states: HashMap<String, Transform> = HashMap::new();

    for (index, command) in commands.iter().enumerate() {
        match command {
            Command::SetTransform {
                target,
                duration_ms,
                easing,
                transform,
            } if is_tracked(target) => {
                let running = match states.get(target) {
                    Some(state) => state.clone(),
                    None => {
                        result.diagnostics.push(Diagnostic::warn(format!(
                            "目标 '{target}' 在第 {} 条指令处没有先行的 changeFigure/changeBg，合成默认基线",
                            index + 1
                        )));
                        Transform::default()
                    }
                };

                let merged = running.merge_over(transform);
                states.insert(target.clone(), merged.clone());
                result.commands.push(Command::SetTransform {
                    target: target.clone(),
                    duration_ms: *duration_ms,
                    easing: easing.clone(),
                    transform: merged,
                });
            }

            Command::ChangeFigure { target, transform, .. } if is_tracked(target) => {
                // 基线重置：变换按原样记录，不合并
                states.insert(target.clone(), transform.clone());
                result.commands.push(command.clone());
            }

            // 背景、空目标与 RawText 原样透传
            _ => result.commands.push(command.clone()),
        }
    }

    result.final_states = states;
    result
}

/// 目标是否参与整理（背景实体与空目标除外）
fn is_tracked(target: &str) -> bool {
    !target.is_empty() && target != BG_TARGET
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Easing;
    use crate::diagnostic::DiagnosticLevel;
    use crate::script::parse_script;
    use crate::transform::Vec2;

    fn set_transform(target: &str, transform: Transform) -> Command {
        Command::SetTransform {
            target: target.to_string(),
            duration_ms: 100,
            easing: Easing::Unspecified,
            transform,
        }
    }

    fn change_figure(target: &str, transform: Transform) -> Command {
        Command::ChangeFigure {
            target: target.to_string(),
            path: "f.png".to_string(),
            transform,
            anchor: Default::default(),
            extras: Vec::new(),
        }
    }

    #[test]
    fn test_reconcile_merges_set_transforms_per_target() {
        let mut first = Transform::with_position(10.0, 0.0);
        first.filters.insert("brightness".to_string(), 0.5);

        let commands = vec![
            change_figure("f1", Transform::default()),
            set_transform("f1", first),
            set_transform("f1", Transform::with_position(20.0, 30.0)),
        ];

        let result = reconcile(&commands);
        assert_eq!(result.commands.len(), 3);

        // 第二条 setTransform 的输出携带合并后的完整状态
        let last = result.commands[2].transform().unwrap();
        assert_eq!(last.position, Vec2::new(20.0, 30.0));
        assert_eq!(last.filters.get("brightness"), Some(&0.5));

        let final_state = &result.final_states["f1"];
        assert_eq!(final_state.position, Vec2::new(20.0, 30.0));
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_reconcile_missing_baseline_warns_and_proceeds() {
        let commands = vec![set_transform("ghost", Transform::with_position(5.0, 5.0))];

        let result = reconcile(&commands);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].level, DiagnosticLevel::Warn);
        assert_eq!(
            result.final_states["ghost"].position,
            Vec2::new(5.0, 5.0)
        );
    }

    #[test]
    fn test_reconcile_change_figure_resets_running_state() {
        let mut filtered = Transform::default();
        filtered.filters.insert("brightness".to_string(), 0.3);

        let commands = vec![
            change_figure("f1", Transform::default()),
            set_transform("f1", filtered),
            change_figure("f1", Transform::with_position(1.0, 1.0)),
        ];

        let result = reconcile(&commands);
        let final_state = &result.final_states["f1"];
        assert_eq!(final_state.position, Vec2::new(1.0, 1.0));
        // changeFigure 重置基线，滤镜不延续
        assert!(final_state.filters.is_empty());
    }

    #[test]
    fn test_reconcile_bg_and_raw_passthrough() {
        let commands = vec![
            Command::ChangeBackground {
                path: "bg.png".to_string(),
                transform: Transform::with_position(9.0, 9.0),
                extras: Vec::new(),
            },
            Command::RawText {
                text: "Alice: Hello".to_string(),
            },
            set_transform(BG_TARGET, Transform::default()),
        ];

        let result = reconcile(&commands);
        assert_eq!(result.commands, commands);
        // 背景不进入最终状态表
        assert!(result.final_states.is_empty());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_reconcile_parsed_sequence_end_to_end() {
        // 端到端：立绘创建后跟一次位移
        let script = "changeFigure:figure1.png -id=figure1 -transform={\"position\":{\"x\":0,\"y\":0},\"scale\":{\"x\":1,\"y\":1}};\n\
                      setTransform:{\"position\":{\"x\":100,\"y\":0}} -target=figure1 -duration=300 -ease=linear;";
        let commands = parse_script(script, 1.0, 1.0);
        assert_eq!(commands.len(), 2);

        let result = reconcile(&commands);
        assert_eq!(
            result.final_states["figure1"].position,
            Vec2::new(100.0, 0.0)
        );
    }
}
