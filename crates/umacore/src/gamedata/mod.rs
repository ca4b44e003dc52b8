use std::{fmt::Display, str::FromStr};

use anyhow::{Result, anyhow};
use enum_iterator::Sequence;
use hashbrown::HashMap;
use log::info;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// 训练类型，序列化为截图识别时使用的短名
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Sequence)]
pub enum TrainType {
    #[serde(rename = "spd")]
    Speed,
    #[serde(rename = "sta")]
    Stamina,
    #[serde(rename = "pwr")]
    Power,
    #[serde(rename = "guts")]
    Guts,
    #[serde(rename = "wit")]
    Wit
}

impl TrainType {
    /// 短名 spd/sta/pwr/guts/wit，也是支援卡统计里的键
    pub fn key(&self) -> &'static str {
        match self {
            Self::Speed => "spd",
            Self::Stamina => "sta",
            Self::Power => "pwr",
            Self::Guts => "guts",
            Self::Wit => "wit"
        }
    }

    /// 事件奖励里使用的属性显示名
    pub fn stat_name(&self) -> &'static str {
        match self {
            Self::Speed => "Speed",
            Self::Stamina => "Stamina",
            Self::Power => "Power",
            Self::Guts => "Guts",
            Self::Wit => "Wisdom"
        }
    }
}

impl Display for TrainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key().to_uppercase())
    }
}

impl FromStr for TrainType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        enum_iterator::all::<TrainType>()
            .find(|t| t.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow!("未知训练类型: {s}"))
    }
}

/// 事件评分表，整个评分过程中只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTable {
    /// 每点属性的权重，按显示名索引
    pub stat_weights: HashMap<String, f64>,
    /// 表里没有的属性使用的权重
    pub default_stat_weight: f64,
    /// 掉属性时的额外惩罚倍率
    pub negative_stat_penalty_mult: f64,
    /// 每点体力
    pub energy_point: f64,
    /// 每点技能点
    pub skill_points_point: f64,
    /// 每点羁绊
    pub bond_point: f64,
    /// 每级Hint
    pub hint_point: f64,
    /// 指定技能Hint的额外价值
    pub hint_name_boosts: HashMap<String, f64>,
    /// 是否计算Hint收益，关闭时Hint只出现在明细里
    pub weight_hints: bool,
    /// "good result" 标记
    pub good_result_bonus: f64,
    /// "bad result" 标记
    pub bad_result_penalty: f64,
    /// 负面状态惩罚
    pub debuff_penalties: HashMap<String, f64>,
    /// 表里没有的负面状态
    pub generic_status_penalty: f64,
    /// 选项名里没有写概率时按这个概率计算
    pub assume_missing_chance_as: f64,
    /// 属性超过上限后的衰减速度
    pub cap_decay_strength: f64,
    /// 避免坏结果时的额外扣分
    pub avoid_bad_nudge: f64,
    /// 分数已经低于这个值时不再额外扣分
    pub avoid_bad_floor: f64,
    /// 必须回避的状态直接给这个分数
    pub hard_avoid_score: f64
}

impl Default for ScoringTable {
    fn default() -> Self {
        let stat_weights = [
            ("Speed", 0.9),
            ("Stamina", 0.9),
            ("Power", 0.9),
            ("Guts", 0.6),
            ("Wisdom", 0.6)
        ];
        let debuff_penalties = [("Slow Metabolism", -12.0), ("Injured", -18.0), ("Fatigue", -6.0)];
        Self {
            stat_weights: stat_weights.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            default_stat_weight: 0.6,
            negative_stat_penalty_mult: 1.2,
            energy_point: 1.0,
            skill_points_point: 0.5,
            bond_point: 0.2,
            hint_point: 1.5,
            hint_name_boosts: HashMap::new(),
            weight_hints: false,
            good_result_bonus: 2.0,
            bad_result_penalty: -4.0,
            debuff_penalties: debuff_penalties.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            generic_status_penalty: -5.0,
            assume_missing_chance_as: 1.0,
            cap_decay_strength: 0.10,
            avoid_bad_nudge: -2.0,
            avoid_bad_floor: -50.0,
            hard_avoid_score: -999.0
        }
    }
}

impl ScoringTable {
    pub fn stat_weight(&self, name: &str) -> f64 {
        self.stat_weights.get(name).copied().unwrap_or(self.default_stat_weight)
    }

    pub fn debuff_penalty(&self, status: &str) -> f64 {
        self.debuff_penalties
            .get(status)
            .copied()
            .unwrap_or(self.generic_status_penalty)
    }

    /// 每级Hint的价值，包含指定技能的额外加成
    pub fn hint_value(&self, name: &str) -> f64 {
        self.hint_point + self.hint_name_boosts.get(name).copied().unwrap_or(0.0)
    }
}

/// 事件查询和事件评分的配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    /// 事件查询接口
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// 查询超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    /// 只查国际服事件
    #[serde(default)]
    pub global_only: bool,
    /// 事件类型过滤
    #[serde(default)]
    pub kinds: Vec<String>,
    /// 最低匹配分数
    #[serde(default)]
    pub min_score: Option<f64>,
    /// 最大体力
    #[serde(default = "default_max_energy")]
    pub max_energy: i32,
    /// 体力低于等于这个值时提高体力奖励的价值
    #[serde(default = "default_prefer_energy_below")]
    pub prefer_energy_below: i32,
    /// 低体力时体力奖励的倍率
    #[serde(default = "default_low_energy_multiplier")]
    pub low_energy_multiplier: f64,
    /// 尽量不选有坏结果的选项
    #[serde(default = "default_true")]
    pub avoid_bad_result: bool,
    /// 出现即否决选项的状态
    #[serde(default)]
    pub hard_avoid_statuses: Vec<String>,
    /// 评分时是否考虑属性上限
    #[serde(default = "default_true")]
    pub use_stat_caps: bool
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
            global_only: false,
            kinds: vec![],
            min_score: None,
            max_energy: default_max_energy(),
            prefer_energy_below: default_prefer_energy_below(),
            low_energy_multiplier: default_low_energy_multiplier(),
            avoid_bad_result: true,
            hard_avoid_statuses: vec![],
            use_stat_caps: true
        }
    }
}

fn default_api_base() -> String {
    "https://umasearch.notvoid.moe/api/event_by_name".to_string()
}

fn default_timeout_secs() -> f64 {
    6.0
}

fn default_max_energy() -> i32 {
    100
}

fn default_prefer_energy_below() -> i32 {
    30
}

fn default_low_energy_multiplier() -> f64 {
    1.5
}

fn default_true() -> bool {
    true
}

/// 运行配置 bot_config.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 属性优先顺序，越靠前越优先
    #[serde(default = "default_priority_stat")]
    pub priority_stat: Vec<TrainType>,
    /// 可接受的最大失败率
    #[serde(default = "default_maximum_failure")]
    pub maximum_failure: i32,
    /// 属性上限，没有配置的按1200
    #[serde(default)]
    pub stat_caps: HashMap<TrainType, i32>,
    /// 体力低于等于这个值时视为低体力
    #[serde(default = "default_energy_rest_threshold")]
    pub energy_rest_threshold: i32,
    /// 低体力误识别修正时不参与统计的训练
    #[serde(default = "default_false_scan_exclude")]
    pub false_scan_exclude: Vec<TrainType>,
    /// 是否查询事件并选择最优选项，否则总是选第一个
    #[serde(default = "default_true")]
    pub use_optimal_event_choices: bool,
    /// 回合数据所在目录
    #[serde(default = "default_turn_dir")]
    pub turn_dir: String,
    /// 事件配置
    #[serde(default)]
    pub event: EventConfig,
    /// 事件评分表
    #[serde(default)]
    pub scoring: ScoringTable
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            priority_stat: default_priority_stat(),
            maximum_failure: default_maximum_failure(),
            stat_caps: HashMap::new(),
            energy_rest_threshold: default_energy_rest_threshold(),
            false_scan_exclude: default_false_scan_exclude(),
            use_optimal_event_choices: true,
            turn_dir: default_turn_dir(),
            event: EventConfig::default(),
            scoring: ScoringTable::default()
        }
    }
}

/// 没有配置上限时的属性上限
pub const DEFAULT_STAT_CAP: i32 = 1200;

impl BotConfig {
    pub fn load(path: &str) -> Result<Self> {
        load_toml(path)
    }

    pub fn stat_cap(&self, train: TrainType) -> i32 {
        self.stat_caps.get(&train).copied().unwrap_or(DEFAULT_STAT_CAP)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_priority_stat() -> Vec<TrainType> {
    enum_iterator::all::<TrainType>().collect()
}

fn default_maximum_failure() -> i32 {
    10
}

fn default_energy_rest_threshold() -> i32 {
    30
}

fn default_false_scan_exclude() -> Vec<TrainType> {
    vec![TrainType::Wit]
}

fn default_turn_dir() -> String {
    "turn".to_string()
}

pub fn load_toml<T: DeserializeOwned>(path: &str) -> Result<T> {
    info!("载入配置 {path}");
    let contents = fs_err::read_to_string(path)?;
    toml::from_str(&contents).map_err(|e| anyhow!("配置文件 {path} 格式错误: {e}"))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;

    #[test]
    fn test_empty_config() -> Result<()> {
        let config: BotConfig = toml::from_str("")?;
        assert_eq!(config, BotConfig::default());
        assert_eq!(config.priority_stat[0], TrainType::Speed);
        assert_eq!(config.stat_cap(TrainType::Guts), DEFAULT_STAT_CAP);
        assert_eq!(config.scoring.stat_weight("Speed"), 0.9);
        Ok(())
    }

    #[test]
    fn test_partial_config() -> Result<()> {
        let text = r#"
            priority_stat = ["pwr", "spd", "wit"]
            maximum_failure = 9
            energy_rest_threshold = 40

            [stat_caps]
            spd = 1100
            wit = 600

            [event]
            hard_avoid_statuses = ["Injured"]

            [scoring]
            weight_hints = true
            good_result_bonus = 3.0
        "#;
        let config: BotConfig = toml::from_str(text)?;
        assert_eq!(config.priority_stat, vec![TrainType::Power, TrainType::Speed, TrainType::Wit]);
        assert_eq!(config.stat_cap(TrainType::Speed), 1100);
        assert_eq!(config.stat_cap(TrainType::Power), DEFAULT_STAT_CAP);
        assert_eq!(config.event.hard_avoid_statuses, vec!["Injured".to_string()]);
        assert_eq!(config.event.prefer_energy_below, 30);
        assert!(config.scoring.weight_hints);
        assert_eq!(config.scoring.good_result_bonus, 3.0);
        // 没写的评分项保持默认
        assert_eq!(config.scoring.debuff_penalty("Injured"), -18.0);
        assert_eq!(config.scoring.debuff_penalty("Night Owl"), -5.0);
        Ok(())
    }

    #[test]
    fn test_sample_config() -> Result<()> {
        let config = BotConfig::load(concat!(env!("CARGO_MANIFEST_DIR"), "/../../bot_config.toml"))?;
        assert_eq!(config.priority_stat[2], TrainType::Wit);
        assert_eq!(config.stat_cap(TrainType::Guts), 900);
        assert_eq!(config.scoring, ScoringTable::default());
        Ok(())
    }

    #[test]
    fn test_train_type() -> Result<()> {
        assert_eq!("WIT".parse::<TrainType>()?, TrainType::Wit);
        assert!("friend".parse::<TrainType>().is_err());
        assert_eq!(TrainType::Wit.stat_name(), "Wisdom");
        assert_eq!(TrainType::Power.to_string(), "PWR");
        Ok(())
    }
}
