//! # Transform 模块
//!
//! 实体的变换状态：位置、缩放、旋转，以及开放的滤镜参数集。
//!
//! ## 设计说明
//!
//! 三个结构字段（`position` / `scale` / `rotation`）在解析完成后总是存在；
//! 其余滤镜参数（brightness、colorRed、bloom 等）是数据驱动的开放键集，
//! 新滤镜类型无需修改任何结构定义。
//!
//! 两套载荷语义：
//!
//! - [`Transform::apply_payload`]：增量合并（`setTransform`），载荷中
//!   缺失的字段继承上一状态
//! - [`Transform::from_payload`]：整体替换（`changeFigure` / `changeBg`），
//!   缺失字段取结构默认值

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 二维向量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    /// 创建新的向量
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 零向量
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// 单位向量 (1, 1)
    pub const fn one() -> Self {
        Self { x: 1.0, y: 1.0 }
    }

    /// 线性插值
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// 按整数舍入导出的滤镜字段（颜色通道与 bevel 通道）
pub const INTEGER_FIELDS: [&str; 7] = [
    "colorRed",
    "colorGreen",
    "colorBlue",
    "bevelRed",
    "bevelGreen",
    "bevelBlue",
    "bevelRotation",
];

/// 判断滤镜字段导出时是否按整数舍入
pub fn is_integer_field(key: &str) -> bool {
    INTEGER_FIELDS.contains(&key)
}

/// 保留两位小数
pub fn round_to_two(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// 变换状态
///
/// 表示一个实体在指令序列某一点的完整变换。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// 位置偏移（工作坐标系）
    pub position: Vec2,
    /// 缩放因子
    pub scale: Vec2,
    /// 旋转角度（弧度）
    pub rotation: f64,
    /// 滤镜参数（开放键集，仅数值）
    #[serde(default)]
    pub filters: BTreeMap<String, f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::zero(),
            scale: Vec2::one(),
            rotation: 0.0,
            filters: BTreeMap::new(),
        }
    }
}

impl Transform {
    /// 创建默认变换（原点、无缩放、无旋转、无滤镜）
    pub fn identity() -> Self {
        Self::default()
    }

    /// 创建只有位置偏移的变换
    pub fn with_position(x: f64, y: f64) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }

    /// 增量合并脚本载荷（`setTransform` 语义）
    ///
    /// 载荷中出现的字段覆盖当前值，缺失的字段继承当前值：
    ///
    /// - `position` / `scale` 逐分量合并（载荷只给 `x` 时 `y` 继承）
    /// - `position` 分量乘以 `scale_factor`（脚本逻辑坐标 → 工作坐标）
    /// - `rotation` 与其余标量字段按出现覆盖、缺失继承
    ///
    /// 非对象载荷（合法 JSON 但不是对象）视为空载荷，全部继承。
    pub fn apply_payload(&self, payload: &Value, scale_factor: Vec2) -> Transform {
        let mut next = self.clone();

        let Some(obj) = payload.as_object() else {
            return next;
        };

        for (key, value) in obj {
            match key.as_str() {
                "position" => {
                    if let Some(x) = component(value, "x") {
                        next.position.x = x * scale_factor.x;
                    }
                    if let Some(y) = component(value, "y") {
                        next.position.y = y * scale_factor.y;
                    }
                }
                "scale" => {
                    if let Some(x) = component(value, "x") {
                        next.scale.x = x;
                    }
                    if let Some(y) = component(value, "y") {
                        next.scale.y = y;
                    }
                }
                "rotation" => {
                    if let Some(r) = value.as_f64() {
                        next.rotation = r;
                    }
                }
                _ => {
                    // 滤镜参数只接受数值，其余类型忽略
                    if let Some(v) = value.as_f64() {
                        next.filters.insert(key.clone(), v);
                    }
                }
            }
        }

        next
    }

    /// 从脚本载荷整体构建（`changeFigure` / `changeBg` 语义）
    ///
    /// 不与任何先前状态合并：缺失字段取结构默认值
    /// （`position = (0,0)`、`scale = (1,1)`、`rotation = 0`）。
    pub fn from_payload(payload: &Value, scale_factor: Vec2) -> Transform {
        Transform::default().apply_payload(payload, scale_factor)
    }

    /// 以 `incoming` 覆盖自身（合并器的深合并规则）
    ///
    /// 结构字段取 `incoming`（已解析的变换总是完整的），滤镜参数取并集，
    /// 冲突键以 `incoming` 为准。
    pub fn merge_over(&self, incoming: &Transform) -> Transform {
        let mut filters = self.filters.clone();
        for (key, value) in &incoming.filters {
            filters.insert(key.clone(), *value);
        }
        Transform {
            position: incoming.position,
            scale: incoming.scale,
            rotation: incoming.rotation,
            filters,
        }
    }

    /// 导出为脚本载荷 JSON
    ///
    /// `position` 分量乘以 `scale_ratio`（工作坐标 → 脚本逻辑坐标），
    /// 所有数值舍入：[`INTEGER_FIELDS`] 取最近整数，其余保留两位小数。
    pub fn to_payload(&self, scale_ratio: Vec2) -> Value {
        let mut obj = serde_json::Map::new();

        obj.insert(
            "position".to_string(),
            serde_json::json!({
                "x": json_number(round_to_two(self.position.x * scale_ratio.x)),
                "y": json_number(round_to_two(self.position.y * scale_ratio.y)),
            }),
        );
        obj.insert(
            "scale".to_string(),
            serde_json::json!({
                "x": json_number(round_to_two(self.scale.x)),
                "y": json_number(round_to_two(self.scale.y)),
            }),
        );
        obj.insert(
            "rotation".to_string(),
            json_number(round_to_two(self.rotation)),
        );

        for (key, value) in &self.filters {
            let rounded = if is_integer_field(key) {
                value.round()
            } else {
                round_to_two(*value)
            };
            obj.insert(key.clone(), json_number(rounded));
        }

        Value::Object(obj)
    }
}

/// 读取 `{"x": .., "y": ..}` 形式载荷中的一个分量
fn component(value: &Value, axis: &str) -> Option<f64> {
    value.as_object()?.get(axis)?.as_f64()
}

/// 数值转 JSON：整数值不带小数点（与 JS `JSON.stringify` 的输出一致）
fn json_number(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Value::from(v as i64)
    } else {
        Value::from(v)
    }
}
