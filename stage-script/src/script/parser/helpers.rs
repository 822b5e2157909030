//! # 辅助解析函数
//!
//! 手写的字符串解析辅助函数，无正则依赖。

/// 把一条指令行拆分为头部与参数列表
///
/// 参数由字面的 ` -` 序列引入：
///
/// 输入: `changeFigure:f.png -id=fig1 -transform={"position":{"x":1}} -next`
/// 输出: `("changeFigure:f.png", ["id=fig1", "transform=...", "next"])`
pub fn split_params(line: &str) -> (&str, Vec<&str>) {
    let mut segments = line.split(" -");
    let head = segments.next().unwrap_or("");
    (head, segments.collect())
}

/// 把 `key=value` 参数拆分为键值对
///
/// 在第一个 `=` 处切分；没有 `=` 的裸参数返回 `(key, None)`。
/// 键值两侧的空白都会被去除。
pub fn split_key_value(param: &str) -> (&str, Option<&str>) {
    match param.split_once('=') {
        Some((key, value)) => (key.trim(), Some(value.trim())),
        None => (param.trim(), None),
    }
}

/// 解析 duration 参数
///
/// 非负整数（毫秒）。缺失或无法解析时返回 `None`，由调用方落到默认值。
pub fn parse_duration(value: Option<&str>) -> Option<u32> {
    value?.trim().parse::<u32>().ok()
}

/// 向有序参数表写入一个键值对
///
/// 同名键后写的覆盖先写的值，但保留首次出现的位置
/// （与 JS 对象的字符串键插入序一致）。
pub fn push_extra(extras: &mut Vec<(String, String)>, key: &str, value: &str) {
    if let Some(entry) = extras.iter_mut().find(|(k, _)| k == key) {
        entry.1 = value.to_string();
    } else {
        extras.push((key.to_string(), value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_params() {
        let (head, params) = split_params(r#"setTransform:{"position":{"x":1}} -target=a -duration=300 -next"#);
        assert_eq!(head, r#"setTransform:{"position":{"x":1}}"#);
        assert_eq!(params, vec!["target=a", "duration=300", "next"]);
    }

    #[test]
    fn test_split_params_no_params() {
        let (head, params) = split_params("changeBg:bg.png");
        assert_eq!(head, "changeBg:bg.png");
        assert!(params.is_empty());
    }

    #[test]
    fn test_split_key_value() {
        assert_eq!(split_key_value("target=fig1"), ("target", Some("fig1")));
        assert_eq!(split_key_value("ease="), ("ease", Some("")));
        assert_eq!(split_key_value("next"), ("next", None));
        // 只在第一个 = 处切分
        assert_eq!(split_key_value("k=a=b"), ("k", Some("a=b")));
        assert_eq!(split_key_value(" id = fig1 "), ("id", Some("fig1")));
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration(Some("300")), Some(300));
        assert_eq!(parse_duration(Some(" 500 ")), Some(500));
        assert_eq!(parse_duration(Some("abc")), None);
        assert_eq!(parse_duration(Some("-5")), None);
        assert_eq!(parse_duration(None), None);
    }

    #[test]
    fn test_push_extra_last_wins_keeps_position() {
        let mut extras = Vec::new();
        push_extra(&mut extras, "motion", "idle");
        push_extra(&mut extras, "next", "");
        push_extra(&mut extras, "motion", "walk");
        assert_eq!(
            extras,
            vec![
                ("motion".to_string(), "walk".to_string()),
                ("next".to_string(), String::new()),
            ]
        );
    }
}
