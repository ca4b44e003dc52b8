//! 奖励归一化
//!
//! 事件查询接口返回的奖励格式并不统一：
//! - 旧格式 `{"type":"stat","name":"Speed","value":10}`
//! - 单键或多键 `{"speed":[5]}` / `{"energy":[10],"speed":[5],"bond":[5]}`
//! - 任意嵌套的分组 `[[{...}, {...}], [{...}]]`
//! - 文本标记 `{"type":"text","text":"※ Bad result"}` 或者纯字符串
//!
//! 先解码成 [`RawReward`]，再展开成有序的 [`RewardRecord`] 列表。

use std::{fmt::Display, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::pattern::extract_textual;

/// 属性名小写 -> 显示名
const STAT_CANON: [(&str, &str); 5] = [
    ("speed", "Speed"),
    ("stamina", "Stamina"),
    ("power", "Power"),
    ("guts", "Guts"),
    ("wisdom", "Wisdom")
];

static NUMBER_RX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d+(\.\d+)?").expect("number regex"));

/// 未经处理的奖励
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum RawReward {
    /// 列表，可以任意嵌套
    List(Vec<RawReward>),
    /// 带 type 字段的奖励
    Typed(Map<String, Value>),
    /// 不带 type 字段的键值奖励
    Pairs(Map<String, Value>),
    /// 文本
    Text(String),
    /// 数字、布尔、null 等无法识别的值
    Scalar(Value)
}

impl From<Value> for RawReward {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) if map.contains_key("type") => Self::Typed(map),
            Value::Object(map) => Self::Pairs(map),
            Value::String(s) => Self::Text(s),
            other => Self::Scalar(other)
        }
    }
}

impl From<&Value> for RawReward {
    fn from(value: &Value) -> Self {
        Self::from(value.clone())
    }
}

impl RawReward {
    /// 深度优先展开所有嵌套列表，保持原顺序
    pub fn flatten(&self) -> Vec<&RawReward> {
        let mut out = vec![];
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a RawReward>) {
        match self {
            Self::List(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            other => out.push(other)
        }
    }
}

/// 归一化后的奖励类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    Stat,
    Energy,
    SkillPoints,
    Bond,
    Hint,
    Status,
    Text,
    Unknown
}

impl Display for RewardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Stat => "stat",
            Self::Energy => "energy",
            Self::SkillPoints => "skill_points",
            Self::Bond => "bond",
            Self::Hint => "hint",
            Self::Status => "status",
            Self::Text => "text",
            Self::Unknown => "unknown"
        };
        write!(f, "{s}")
    }
}

/// 归一化后的单条奖励
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardRecord {
    pub kind: RewardKind,
    /// 显示名
    pub name: Option<String>,
    /// 数值，只有 stat/energy/skill_points/bond/hint 有
    pub value: Option<i32>,
    /// 原始片段，只用于调试和识别好坏结果
    pub raw: String
}

impl RewardRecord {
    pub fn new(kind: RewardKind, name: Option<String>, value: Option<i32>, raw: impl Into<String>) -> Self {
        Self {
            kind,
            name,
            value,
            raw: raw.into()
        }
    }

    pub fn text(raw: impl Into<String>) -> Self {
        Self::new(RewardKind::Text, None, None, raw)
    }

    pub fn unknown(name: Option<String>, raw: impl Into<String>) -> Self {
        Self::new(RewardKind::Unknown, name, None, raw)
    }

    pub fn hint(name: impl Into<String>, level: i32, raw: impl Into<String>) -> Self {
        Self::new(RewardKind::Hint, Some(name.into()), Some(level), raw)
    }

    pub fn status(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::new(RewardKind::Status, Some(name.into()), None, raw)
    }

    /// 按名字区分体力、技能点、羁绊和普通属性
    pub fn classify(name: &str, value: i32, raw: impl Into<String>) -> Self {
        let (kind, name) = match name.to_lowercase().as_str() {
            "energy" | "stamina" => (RewardKind::Energy, "Energy".to_string()),
            "skill points" | "skill point" => (RewardKind::SkillPoints, "Skill points".to_string()),
            "bond" => (RewardKind::Bond, "Bond".to_string()),
            _ => (RewardKind::Stat, canon_stat(name))
        };
        Self::new(kind, Some(name), Some(value), raw)
    }
}

/// 属性显示名，不认识的属性首字母大写
pub fn canon_stat(name: &str) -> String {
    let lower = name.to_lowercase();
    if let Some((_, canon)) = STAT_CANON.iter().find(|(k, _)| *k == lower) {
        return canon.to_string();
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Unknown".to_string()
    }
}

/// 找到第一个数字: 数字本身、列表里第一个数字、字符串里第一个数字子串
pub fn first_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Array(items) => items.iter().find_map(|x| x.as_f64()),
        Value::String(s) => NUMBER_RX.find(s).and_then(|m| m.as_str().parse().ok()),
        _ => None
    }
}

/// 把一个选项的奖励展开成有序的归一化奖励
pub fn normalize_rewards(reward: &RawReward) -> Vec<RewardRecord> {
    let mut out = vec![];
    for item in reward.flatten() {
        match item {
            RawReward::Typed(map) => normalize_typed(map, &mut out),
            RawReward::Pairs(map) => {
                for (key, value) in map {
                    let raw = pair_raw(key, value);
                    match first_number(value) {
                        // 截断小数，和游戏里显示的整数一致
                        Some(amount) => out.push(RewardRecord::classify(key, amount as i32, raw)),
                        None => out.push(RewardRecord::unknown(Some(key.clone()), raw))
                    }
                }
            }
            RawReward::Text(text) => {
                out.push(RewardRecord::text(text.as_str()));
                extract_textual(text, &mut out);
            }
            RawReward::Scalar(value) => out.push(RewardRecord::unknown(None, value.to_string())),
            // flatten 之后不会再有列表
            RawReward::List(_) => {}
        }
    }
    out
}

fn pair_raw(key: &str, value: &Value) -> String {
    let mut map = Map::new();
    map.insert(key.to_string(), value.clone());
    Value::Object(map).to_string()
}

fn normalize_typed(map: &Map<String, Value>, out: &mut Vec<RewardRecord>) {
    let raw = Value::Object(map.clone()).to_string();
    match map.get("type").and_then(|t| t.as_str()) {
        Some("stat") => {
            let name = map.get("name").and_then(|n| n.as_str()).unwrap_or_default();
            let value = map.get("value").and_then(|v| v.as_f64()).map(|v| v as i32).unwrap_or(0);
            out.push(RewardRecord::classify(name, value, raw));
        }
        Some("text") => {
            let text = match map.get("text") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => String::new()
            };
            out.push(RewardRecord::text(text.as_str()));
            extract_textual(&text, out);
        }
        _ => out.push(RewardRecord::unknown(None, raw))
    }
}
