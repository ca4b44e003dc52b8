use hashbrown::{HashMap, HashSet};

use crate::{
    gamedata::{BotConfig, TrainType},
    sensors::TurnState
};

/// 单次事件评分使用的上下文，评分过程中不可变
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringContext {
    /// 当前体力
    pub current_energy: Option<i32>,
    /// 最大体力
    pub max_energy: Option<i32>,
    /// 体力低于等于这个值时提高体力奖励的价值
    pub prefer_energy_below: i32,
    /// 低体力时体力奖励的倍率
    pub low_energy_multiplier: f64,
    /// 属性上限，按显示名索引
    pub stat_caps: HashMap<String, i32>,
    /// 当前属性，按显示名索引
    pub current_stats: HashMap<String, i32>,
    /// 有坏结果的选项额外扣分
    pub avoid_bad_result: bool,
    /// 出现即否决选项的状态
    pub hard_avoid_statuses: HashSet<String>
}

impl Default for ScoringContext {
    fn default() -> Self {
        Self {
            current_energy: None,
            max_energy: None,
            prefer_energy_below: 30,
            low_energy_multiplier: 1.5,
            stat_caps: HashMap::new(),
            current_stats: HashMap::new(),
            avoid_bad_result: true,
            hard_avoid_statuses: HashSet::new()
        }
    }
}

impl ScoringContext {
    /// 只使用配置，不读取回合信息
    pub fn from_config(config: &BotConfig) -> Self {
        let event = &config.event;
        Self {
            prefer_energy_below: event.prefer_energy_below,
            low_energy_multiplier: event.low_energy_multiplier,
            avoid_bad_result: event.avoid_bad_result,
            hard_avoid_statuses: event.hard_avoid_statuses.iter().cloned().collect(),
            ..Default::default()
        }
    }

    /// 使用配置和当前回合的体力、属性
    pub fn for_turn(config: &BotConfig, turn: &TurnState) -> Self {
        let mut ctx = Self::from_config(config).with_energy(turn.energy, config.event.max_energy);
        if config.event.use_stat_caps {
            for train in enum_iterator::all::<TrainType>() {
                ctx.stat_caps.insert(train.stat_name().to_string(), config.stat_cap(train));
                if let Some(value) = turn.stats.get(&train) {
                    ctx.current_stats.insert(train.stat_name().to_string(), *value);
                }
            }
        }
        ctx
    }

    pub fn with_energy(mut self, current: i32, max: i32) -> Self {
        self.current_energy = Some(current);
        self.max_energy = Some(max);
        self
    }

    pub fn with_stat(mut self, name: &str, current: i32, cap: i32) -> Self {
        self.current_stats.insert(name.to_string(), current);
        self.stat_caps.insert(name.to_string(), cap);
        self
    }

    pub fn with_hard_avoid(mut self, status: &str) -> Self {
        self.hard_avoid_statuses.insert(status.to_string());
        self
    }

    pub fn with_avoid_bad_result(mut self, avoid: bool) -> Self {
        self.avoid_bad_result = avoid;
        self
    }

    /// 体力已知且处于低体力
    pub fn is_low_energy(&self) -> bool {
        match (self.current_energy, self.max_energy) {
            (Some(current), Some(_)) => current <= self.prefer_energy_below,
            _ => false
        }
    }
}
