use anyhow::Result;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use umacore::{
    gamedata::TrainType,
    sensors::{GameSensors, TurnState},
    training::{GameCalendar, TrainingSnapshot}
};

pub mod turnfile;
pub mod umasearch;

/// 识别端写出的回合信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnStatus {
    /// 年份标签，如 "Classic Year Early Jun"
    pub year: String,
    /// 当前五维
    #[serde(default)]
    pub stats: HashMap<TrainType, i32>,
    /// 体力
    pub energy: i32,
    /// 日历，没有时从年份标签解析
    #[serde(default)]
    pub calendar: Option<GameCalendar>,
    /// 各训练的失败率和人头
    #[serde(default)]
    pub trainings: TrainingSnapshot,
    /// 当前事件名，没有事件时为空
    #[serde(default)]
    pub event_name: Option<String>
}

impl GameSensors for TurnStatus {
    fn current_year(&self) -> String {
        self.year.clone()
    }

    fn current_stats(&self) -> HashMap<TrainType, i32> {
        self.stats.clone()
    }

    fn current_energy(&self) -> i32 {
        self.energy
    }

    fn calendar(&self) -> Result<GameCalendar> {
        match &self.calendar {
            Some(calendar) => Ok(calendar.clone()),
            None => GameCalendar::from_year_label(&self.year)
        }
    }
}

impl TurnStatus {
    pub fn turn_state(&self) -> TurnState {
        TurnState::read(self)
    }

    /// 去掉首尾空白后的事件名
    pub fn event(&self) -> Option<&str> {
        self.event_name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}
