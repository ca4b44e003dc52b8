use anyhow::{Result, anyhow};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 游戏内日历
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCalendar {
    /// 月份，可能是 "June"、"Jun" 或者 "6"
    #[serde(deserialize_with = "month_from_value")]
    pub month: String,
    /// 月内第几周，上旬为1，下旬为4
    pub week: i32
}

fn month_from_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("无法识别的月份: {other}")))
    }
}

impl GameCalendar {
    pub fn new(month: impl Into<String>, week: i32) -> Self {
        Self {
            month: month.into(),
            week
        }
    }

    /// 从 "Classic Year Early Jun" 这样的年份标签解析
    pub fn from_year_label(label: &str) -> Result<Self> {
        let parts: Vec<_> = label.split_whitespace().collect();
        match parts.as_slice() {
            [_, "Year", half, month, ..] => {
                let week = match half.to_lowercase().as_str() {
                    "early" => 1,
                    "late" => 4,
                    _ => return Err(anyhow!("无法识别上下旬: {label}"))
                };
                Ok(Self::new(*month, week))
            }
            _ => Err(anyhow!("年份标签里没有月份: {label}"))
        }
    }

    pub fn is_june(&self) -> bool {
        let month = self.month.trim().to_lowercase();
        matches!(month.as_str(), "june" | "jun") || month.parse::<i32>().is_ok_and(|m| m == 6)
    }

    /// 6月上旬(1-2周)或者下旬(4周以后)
    pub fn is_early_or_late_june(&self) -> bool {
        self.is_june() && ((1..=2).contains(&self.week) || self.week >= 4)
    }
}

/// 读不到日历时保守处理，视为不在6月
pub fn in_june_window(calendar: Option<&GameCalendar>) -> bool {
    calendar.is_some_and(|c| c.is_early_or_late_june())
}
