//! # Animation 模块
//!
//! 从指令序列派生预览播放用的动画段，以及段内插值采样。
//!
//! ## 时间模型
//!
//! 所有实体的动画段都从相对时刻 0 开始（多实体同时播放），
//! 段的结束时刻即其 `duration_ms`。同一实体的多个段首尾相接：
//! 每段的起点是上一段的终点。

use std::f64::consts::PI;

use crate::command::{Command, Easing};
use crate::transform::Transform;

/// 缓动曲线
///
/// 脚本里的缓动是自由命名的（由引擎解释）；预览播放只认识其中的
/// 常用集合，未知名字退到引擎默认的 [`EaseInOut`]。
///
/// [`EaseInOut`]: EasingCurve::EaseInOut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EasingCurve {
    /// 线性（匀速）
    Linear,
    /// 缓入（先慢后快）
    EaseIn,
    /// 缓出（先快后慢）
    EaseOut,
    /// 缓入缓出（两头慢中间快）
    #[default]
    EaseInOut,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    EaseOutQuad,
    /// 二次缓入缓出
    EaseInOutQuad,
}

impl EasingCurve {
    /// 从缓动设置解析曲线
    ///
    /// [`Easing::Unspecified`] 与 [`Easing::UseDefault`] 以及未知名字
    /// 都取默认曲线。
    pub fn from_easing(easing: &Easing) -> Self {
        easing.name().map_or_else(Self::default, Self::from_name)
    }

    /// 按名字解析曲线（未知名字取默认）
    pub fn from_name(name: &str) -> Self {
        match name {
            "linear" => Self::Linear,
            "easeIn" => Self::EaseIn,
            "easeOut" => Self::EaseOut,
            "easeInOut" => Self::EaseInOut,
            "easeInQuad" => Self::EaseInQuad,
            "easeOutQuad" => Self::EaseOutQuad,
            "easeInOutQuad" => Self::EaseInOutQuad,
            _ => Self::default(),
        }
    }

    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    ///
    /// # 返回
    /// - 缓动后的进度值 (0.0 - 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseIn => 1.0 - (t * PI / 2.0).cos(),
            Self::EaseOut => (t * PI / 2.0).sin(),
            Self::EaseInOut => -((PI * t).cos() - 1.0) / 2.0,
            Self::EaseInQuad => t * t,
            Self::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

/// 动画段
///
/// 一个实体从 `from` 状态到 `to` 状态的一次过渡。
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSegment {
    /// 目标实体 id
    pub target: String,
    /// 起始状态
    pub from: Transform,
    /// 结束状态
    pub to: Transform,
    /// 时长（毫秒）
    pub duration_ms: u32,
    /// 缓动设置（来自产生此段的指令）
    pub easing: Easing,
}

impl AnimationSegment {
    /// 在进度 `t`（0.0 - 1.0）处采样中间状态
    ///
    /// 位置、缩放、旋转与两端都出现的滤镜参数线性插值（经缓动曲线
    /// 变换后的进度）；只出现在一端的滤镜参数取结束端的值。
    pub fn sample(&self, t: f64) -> Transform {
        let eased = EasingCurve::from_easing(&self.easing).apply(t);

        let mut filters = self.to.filters.clone();
        for (key, to_value) in &self.to.filters {
            if let Some(from_value) = self.from.filters.get(key) {
                filters.insert(key.clone(), from_value + (to_value - from_value) * eased);
            }
        }

        Transform {
            position: self.from.position.lerp(self.to.position, eased),
            scale: self.from.scale.lerp(self.to.scale, eased),
            rotation: self.from.rotation + (self.to.rotation - self.from.rotation) * eased,
            filters,
        }
    }
}

/// 从指令序列构建动画段列表
///
/// 对每个目标（按首次出现顺序）：
///
/// - 基线是该目标的 `changeFigure` / `changeBg` 变换；没有的话，
///   第一条 `setTransform` 的变换充当基线（自身不产生段）
/// - 此后每条 `setTransform` 产生一段：起点为上一段的终点，
///   终点为该指令的变换（解析期已补全，无需再合并）
pub fn build_animation_sequence(commands: &[Command]) -> Vec<AnimationSegment> {
    // (target, 当前末端状态)，Vec 保持首次出现顺序
    let mut cursors: Vec<(String, Transform)> = Vec::new();
    let mut segments = Vec::new();

    for command in commands {
        match command {
            Command::SetTransform {
                target,
                duration_ms,
                easing,
                transform,
            } => {
                match cursors.iter_mut().find(|(t, _)| t == target) {
                    Some((_, end_state)) => {
                        segments.push(AnimationSegment {
                            target: target.clone(),
                            from: end_state.clone(),
                            to: transform.clone(),
                            duration_ms: *duration_ms,
                            easing: easing.clone(),
                        });
                        *end_state = transform.clone();
                    }
                    // 无基线：第一条 setTransform 自身充当基线
                    None => cursors.push((target.clone(), transform.clone())),
                }
            }

            Command::ChangeFigure { target, transform, .. } => {
                set_baseline(&mut cursors, target, transform);
            }
            Command::ChangeBackground { transform, .. } => {
                set_baseline(&mut cursors, crate::command::BG_TARGET, transform);
            }

            Command::RawText { .. } => {}
        }
    }

    segments
}

/// 建立或重置一个目标的基线状态
fn set_baseline(cursors: &mut Vec<(String, Transform)>, target: &str, transform: &Transform) {
    match cursors.iter_mut().find(|(t, _)| t == target) {
        Some((_, end_state)) => *end_state = transform.clone(),
        None => cursors.push((target.to_string(), transform.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;
    use crate::transform::Vec2;

    #[test]
    fn test_easing_curve_from_name() {
        assert_eq!(EasingCurve::from_name("linear"), EasingCurve::Linear);
        assert_eq!(EasingCurve::from_name("easeOutQuad"), EasingCurve::EaseOutQuad);
        // 未知名字退到默认
        assert_eq!(EasingCurve::from_name("bounceWildly"), EasingCurve::EaseInOut);
    }

    #[test]
    fn test_easing_endpoints() {
        for curve in [
            EasingCurve::Linear,
            EasingCurve::EaseIn,
            EasingCurve::EaseOut,
            EasingCurve::EaseInOut,
            EasingCurve::EaseInQuad,
            EasingCurve::EaseOutQuad,
            EasingCurve::EaseInOutQuad,
        ] {
            assert!(curve.apply(0.0).abs() < 1e-9, "{curve:?} 起点应为 0");
            assert!((curve.apply(1.0) - 1.0).abs() < 1e-9, "{curve:?} 终点应为 1");
        }
    }

    #[test]
    fn test_sequence_baseline_from_change_figure() {
        let script = "changeFigure:f.png -id=a -transform={\"position\":{\"x\":0,\"y\":0}};\n\
                      setTransform:{\"position\":{\"x\":100}} -target=a -duration=300;\n\
                      setTransform:{\"position\":{\"y\":50}} -target=a -duration=200;";
        let segments = build_animation_sequence(&parse_script(script, 1.0, 1.0));

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].from.position, Vec2::zero());
        assert_eq!(segments[0].to.position, Vec2::new(100.0, 0.0));
        assert_eq!(segments[0].duration_ms, 300);
        // 第二段从第一段的终点继续
        assert_eq!(segments[1].from.position, Vec2::new(100.0, 0.0));
        assert_eq!(segments[1].to.position, Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_sequence_first_set_transform_is_baseline() {
        let script = "setTransform:{\"position\":{\"x\":10}} -target=a -duration=100;\n\
                      setTransform:{\"position\":{\"x\":20}} -target=a -duration=100;";
        let segments = build_animation_sequence(&parse_script(script, 1.0, 1.0));

        // 第一条充当基线，只有一段
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].from.position, Vec2::new(10.0, 0.0));
        assert_eq!(segments[0].to.position, Vec2::new(20.0, 0.0));
    }

    #[test]
    fn test_sequence_lone_commands_produce_no_segments() {
        let script = "changeFigure:f.png -id=a;\nchangeBg:bg.png;";
        let segments = build_animation_sequence(&parse_script(script, 1.0, 1.0));
        assert!(segments.is_empty());
    }

    #[test]
    fn test_sample_midpoint_linear() {
        let segment = AnimationSegment {
            target: "a".to_string(),
            from: Transform::with_position(0.0, 0.0),
            to: Transform::with_position(100.0, 50.0),
            duration_ms: 300,
            easing: Easing::Named("linear".to_string()),
        };

        let mid = segment.sample(0.5);
        assert_eq!(mid.position, Vec2::new(50.0, 25.0));
    }

    #[test]
    fn test_sample_interpolates_shared_filters() {
        let mut from = Transform::default();
        from.filters.insert("brightness".to_string(), 0.0);
        let mut to = Transform::default();
        to.filters.insert("brightness".to_string(), 2.0);
        to.filters.insert("contrast".to_string(), 1.5);

        let segment = AnimationSegment {
            target: "a".to_string(),
            from,
            to,
            duration_ms: 100,
            easing: Easing::Named("linear".to_string()),
        };

        let mid = segment.sample(0.5);
        assert_eq!(mid.filters.get("brightness"), Some(&1.0));
        // 仅出现在终点的滤镜取终点值
        assert_eq!(mid.filters.get("contrast"), Some(&1.5));
    }
}
