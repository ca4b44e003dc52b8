//! 文本奖励里的Hint、状态和选项名里的概率
//!
//! 每个模式都是独立的纯函数，匹配失败返回 None。
//! 新的文本模式加到 [`TEXT_PATTERNS`] 里即可。

use std::sync::LazyLock;

use regex::Regex;

use super::reward::RewardRecord;

/// 文本模式产生的奖励类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// `<技能名> [hint] [+]<等级>`
    Hint,
    /// `Get|Gain|Apply <状态> status`
    Status
}

/// 一条文本模式，必须带 name 分组，Hint 还需要 lvl 分组
#[derive(Debug)]
pub struct TextPattern {
    pub kind: PatternKind,
    regex: Regex
}

impl TextPattern {
    fn new(kind: PatternKind, pattern: &str) -> Self {
        Self {
            kind,
            regex: Regex::new(pattern).expect("text pattern")
        }
    }

    /// 在文本里找第一处匹配，产生一条奖励
    pub fn extract(&self, text: &str) -> Option<RewardRecord> {
        let caps = self.regex.captures(text)?;
        let name = clean_name(caps.name("name")?.as_str());
        match self.kind {
            PatternKind::Hint => {
                // 超出 i32 范围时饱和，和奖励数值的处理一致
                let level = caps.name("lvl")?.as_str().parse::<f64>().ok()? as i32;
                Some(RewardRecord::hint(name, level, text))
            }
            PatternKind::Status => Some(RewardRecord::status(name, text))
        }
    }
}

pub static TEXT_PATTERNS: LazyLock<Vec<TextPattern>> = LazyLock::new(|| {
    vec![
        TextPattern::new(PatternKind::Hint, r"(?i)(?P<name>.+?)\s*(?:hint\s*)?\+?(?P<lvl>-?\d+)"),
        TextPattern::new(PatternKind::Status, r"(?i)(?:Get|Gain|Apply)\s+(?P<name>.+?)\s+status"),
    ]
});

static CHANCE_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~?\s*(?P<pct>\d{1,3})\s*%").expect("chance regex"));

fn clean_name(name: &str) -> String {
    name.trim().trim_end_matches(':').to_string()
}

fn find_pattern(kind: PatternKind, text: &str) -> Option<RewardRecord> {
    TEXT_PATTERNS
        .iter()
        .filter(|p| p.kind == kind)
        .find_map(|p| p.extract(text))
}

/// Hint 名和等级
pub fn extract_hint(text: &str) -> Option<(String, i32)> {
    let record = find_pattern(PatternKind::Hint, text)?;
    Some((record.name?, record.value?))
}

/// 获得的状态名
pub fn extract_status(text: &str) -> Option<String> {
    find_pattern(PatternKind::Status, text)?.name
}

/// 选项名里的概率，范围 [0, 1]
pub fn extract_chance(option_name: &str) -> Option<f64> {
    let caps = CHANCE_RX.captures(option_name)?;
    let pct: f64 = caps.name("pct")?.as_str().parse().ok()?;
    Some((pct / 100.0).clamp(0.0, 1.0))
}

/// 把文本里能识别的Hint和状态追加到 out，不会替换已有内容
pub fn extract_textual(text: &str, out: &mut Vec<RewardRecord>) {
    out.extend(TEXT_PATTERNS.iter().filter_map(|p| p.extract(text)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RewardKind;

    #[test]
    fn test_hint() {
        assert_eq!(extract_hint("Groundwork hint +1"), Some(("Groundwork".to_string(), 1)));
        assert_eq!(extract_hint("Corner Recovery: +3"), Some(("Corner Recovery".to_string(), 3)));
        assert_eq!(extract_hint("Pace Chaser HINT 2"), Some(("Pace Chaser".to_string(), 2)));
        assert_eq!(extract_hint("Focus -1"), Some(("Focus".to_string(), -1)));
        assert_eq!(extract_hint("※ Bad result"), None);
    }

    #[test]
    fn test_hint_level_saturates() {
        assert_eq!(extract_hint("Groundwork +99999999999"), Some(("Groundwork".to_string(), i32::MAX)));
        assert_eq!(extract_hint("Groundwork hint -99999999999"), Some(("Groundwork".to_string(), i32::MIN)));
    }

    #[test]
    fn test_status() {
        assert_eq!(extract_status("Get Slow Metabolism status"), Some("Slow Metabolism".to_string()));
        assert_eq!(extract_status("gain Night Owl: status"), Some("Night Owl".to_string()));
        assert_eq!(extract_status("APPLY Practice Perfect ○ status"), Some("Practice Perfect ○".to_string()));
        assert_eq!(extract_status("Lose Migraine status"), None);
    }

    #[test]
    fn test_chance() {
        assert_eq!(extract_chance("~30% chance: gain"), Some(0.30));
        assert_eq!(extract_chance("Randomly (50 %)"), Some(0.5));
        assert_eq!(extract_chance("999% sure"), Some(1.0));
        assert_eq!(extract_chance("Let's train!"), None);
    }

    #[test]
    fn test_extract_textual_appends() {
        let mut out = vec![RewardRecord::text("keep me")];
        extract_textual("Get Fast Learner status", &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].raw, "keep me");
        assert_eq!(out[1].kind, RewardKind::Status);

        // 同一段文本可以同时有Hint和状态
        let mut out = vec![];
        extract_textual("Get Charming status, Groundwork hint +2", &mut out);
        let kinds: Vec<_> = out.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RewardKind::Hint, RewardKind::Status]);
        assert_eq!(out[0].value, Some(2));

        let mut out = vec![];
        extract_textual("nothing here", &mut out);
        assert!(out.is_empty());
    }
}
