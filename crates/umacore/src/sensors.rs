use anyhow::Result;
use hashbrown::HashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{gamedata::TrainType, training::GameCalendar};

/// 游戏状态读取，由截图识别或者回合文件提供
pub trait GameSensors {
    /// 年份标签，如 "Classic Year Early Jun"
    fn current_year(&self) -> String;
    /// 当前五维
    fn current_stats(&self) -> HashMap<TrainType, i32>;
    /// 体力百分比 0-100
    fn current_energy(&self) -> i32;
    /// 当前月份和周，默认从年份标签解析
    fn calendar(&self) -> Result<GameCalendar> {
        GameCalendar::from_year_label(&self.current_year())
    }
}

/// 一次决策使用的游戏状态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnState {
    pub year: String,
    #[serde(default)]
    pub stats: HashMap<TrainType, i32>,
    pub energy: i32,
    /// 读取失败时为 None，不启用日历相关的策略
    #[serde(default)]
    pub calendar: Option<GameCalendar>
}

impl TurnState {
    pub fn read<S: GameSensors + ?Sized>(sensors: &S) -> Self {
        let calendar = sensors
            .calendar()
            .inspect_err(|e| debug!("无法读取日历: {e}"))
            .ok();
        Self {
            year: sensors.current_year(),
            stats: sensors.current_stats(),
            energy: sensors.current_energy(),
            calendar
        }
    }

    pub fn stat(&self, train: TrainType) -> i32 {
        self.stats.get(&train).copied().unwrap_or(0)
    }
}
