//! 事件选项选择
//!
//! 查询事件 -> 逐个选项评分 -> 选出分数最高的选项。
//! 任何查询或解析失败都退化为"选第一个"，不会向外抛出错误。

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{OptionScore, ScoringContext, reward::RawReward, score_option};
use crate::{
    gamedata::{EventConfig, ScoringTable},
    utils::make_table
};

/// 事件查询参数
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventQuery {
    pub event_name: String,
    /// 只查国际服事件
    pub global_only: bool,
    /// 事件类型过滤
    pub kinds: Vec<String>,
    /// 最低匹配分数
    pub min_score: Option<f64>
}

impl EventQuery {
    pub fn new(event_name: &str) -> Self {
        Self {
            event_name: event_name.to_string(),
            ..Default::default()
        }
    }

    /// 使用配置里的过滤条件
    pub fn with_config(event_name: &str, config: &EventConfig) -> Self {
        Self {
            event_name: event_name.to_string(),
            global_only: config.global_only,
            kinds: config.kinds.clone(),
            min_score: config.min_score
        }
    }

    /// 转成URL查询参数
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("event_name", self.event_name.clone())];
        if self.global_only {
            params.push(("global_only", "true".to_string()));
        }
        if !self.kinds.is_empty() {
            params.push(("kinds", self.kinds.join(",")));
        }
        if let Some(min_score) = self.min_score {
            params.push(("min_score", min_score.to_string()));
        }
        params
    }
}

/// 事件数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMatchData {
    /// 选项名 -> 奖励，也可能是奖励列表
    #[serde(default)]
    pub options: Value
}

/// 查询命中的事件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMatch {
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub data: EventMatchData
}

/// 事件查询，失败、超时、格式错误统一返回 None
pub trait EventSource {
    fn fetch(&self, query: &EventQuery) -> Option<EventMatch>;
}

/// 单个选项的评分结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredOption {
    /// 从1开始
    pub index: usize,
    pub name: String,
    pub score: f64,
    #[serde(skip)]
    pub details: Vec<String>
}

/// 选择结果
#[derive(Debug, Clone, PartialEq)]
pub struct EventChoice {
    /// 选中的选项，从1开始
    pub index: usize,
    /// 选项总数
    pub total: usize,
    /// 所有选项的评分，没有数据时为空
    pub options: Vec<ScoredOption>
}

impl EventChoice {
    /// 没有可用信息，选第一个
    pub fn fallback() -> Self {
        Self {
            index: 1,
            total: 1,
            options: vec![]
        }
    }

    pub fn is_informed(&self) -> bool {
        !self.options.is_empty()
    }
}

/// 把选项统一成 (选项名, 奖励) 列表，列表形式的选项命名为 "Option N"
pub fn collect_options(options: &Value) -> Option<Vec<(String, RawReward)>> {
    match options {
        Value::Object(map) => Some(
            map.iter()
                .map(|(name, rewards)| (name.clone(), RawReward::from(rewards)))
                .collect()
        ),
        Value::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(i, rewards)| (format!("Option {}", i + 1), RawReward::from(rewards)))
                .collect()
        ),
        _ => None
    }
}

/// 逐个选项评分，选项格式不支持时返回 None
pub fn rank_options(options: &Value, ctx: &ScoringContext, table: &ScoringTable) -> Option<Vec<ScoredOption>> {
    let options = collect_options(options)?;
    Some(
        options
            .into_iter()
            .enumerate()
            .map(|(i, (name, rewards))| {
                let OptionScore { score, details } = score_option(&name, &rewards, ctx, table);
                ScoredOption {
                    index: i + 1,
                    name,
                    score,
                    details
                }
            })
            .collect()
    )
}

/// 分数严格更高才替换，平分时保留先出现的选项
pub fn best_option(options: &[ScoredOption]) -> Option<&ScoredOption> {
    let mut best: Option<&ScoredOption> = None;
    for option in options {
        if best.is_none_or(|b| option.score > b.score) {
            best = Some(option);
        }
    }
    best
}

/// 查询事件并选出最优选项
pub fn select_choice<S: EventSource + ?Sized>(
    source: &S, query: &EventQuery, ctx: &ScoringContext, table: &ScoringTable
) -> EventChoice {
    let Some(event) = source.fetch(query) else {
        warn!("没有查到事件 '{}'，选择第一个选项", query.event_name);
        return EventChoice::fallback();
    };
    let name = event.event_name.as_deref().unwrap_or(&query.event_name);
    let Some(options) = rank_options(&event.data.options, ctx, table) else {
        warn!("事件 '{name}' 的选项格式不支持: {}", event.data.options);
        return EventChoice::fallback();
    };
    let Some(index) = best_option(&options).map(|b| b.index) else {
        warn!("事件 '{name}' 没有选项");
        return EventChoice::fallback();
    };

    debug!("事件: {name}");
    for option in &options {
        debug!("选项 {}: {}", option.index, option.name);
        for line in &option.details {
            debug!("    {line}");
        }
        debug!("    => 总分: {:.2}", option.score);
    }
    if let Ok(table) = make_table(&options) {
        debug!("\n{table}");
    }

    let choice = EventChoice {
        index,
        total: options.len(),
        options
    };
    info!("事件 '{name}' 选择第 {} 个选项 (共 {} 个)", choice.index, choice.total);
    choice
}
