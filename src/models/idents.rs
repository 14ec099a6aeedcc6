//! 标识符格式校验
//!
//! 报表消费方依赖这三种格式，所以一律用模式校验，
//! 而不是「单元格非空」这种弱判断。

use regex::Regex;
use std::sync::OnceLock;

/// 任务编号：DRT 前缀 + 大写字母/数字，总长至少 10（如 DRT2025080401VEC）
pub fn is_task_id(s: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^DRT[A-Z0-9]{7,}$").expect("任务编号正则非法"))
        .is_match(s)
}

/// 运单号：PH 前缀 + 至少 8 位数字，可带一位结尾字母（如 PH251249207504S）
pub fn is_tracking_no(s: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^PH\d{8,}[A-Z]?$").expect("运单号正则非法"))
        .is_match(s)
}

/// 从一段自由文本中找出所有运单号
pub fn find_tracking_nos(text: &str) -> Vec<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"PH\d{8,}[A-Z]?").expect("运单号正则非法"))
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// 发件人 ID：至少 8 位的纯数字串（如 1257601721）
pub fn is_sender_id(s: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{8,}$").expect("发件人 ID 正则非法"))
        .is_match(s)
}

/// 从一段自由文本中找出第一个像发件人 ID 的长数字串
pub fn find_sender_id(text: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{8,}\b").expect("发件人 ID 正则非法"))
        .find(text)
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_pattern() {
        assert!(is_task_id("DRT2025080401VEC"));
        assert!(is_task_id("DRT0000001"));
        // 前缀不对
        assert!(!is_task_id("XRT2025080401VEC"));
        // 太短
        assert!(!is_task_id("DRT123"));
        // 小写不接受
        assert!(!is_task_id("drt2025080401vec"));
        assert!(!is_task_id(""));
    }

    #[test]
    fn test_tracking_no_pattern() {
        assert!(is_tracking_no("PH251249207504S"));
        assert!(is_tracking_no("PH25124920"));
        assert!(!is_tracking_no("PH1234"));
        assert!(!is_tracking_no("XX251249207504S"));
        assert!(!is_tracking_no("PH251249207504SS"));
    }

    #[test]
    fn test_sender_id_pattern() {
        assert!(is_sender_id("1257601721"));
        assert!(is_sender_id("12576017"));
        assert!(!is_sender_id("1234567"));
        assert!(!is_sender_id("1257601721A"));
        assert!(!is_sender_id("DRT2025080401VEC"));
    }

    #[test]
    fn test_find_in_free_text() {
        let text = "1257601721  -  PH251249207504S / PH251249207505";
        assert_eq!(
            find_tracking_nos(text),
            vec!["PH251249207504S".to_string(), "PH251249207505".to_string()]
        );
        assert_eq!(find_sender_id(text).as_deref(), Some("1257601721"));
        assert_eq!(find_sender_id("no ids here"), None);
    }
}
