use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::gamedata::TrainType;

/// 单个训练的识别结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStat {
    /// 失败率 0-100，识别失败时为 -1
    pub failure: i32,
    /// 支援卡人头总数
    #[serde(default)]
    pub total_support: u32,
    /// 支援卡类型 -> 人头数，键为 spd/sta/pwr/guts/wit/friend
    #[serde(default)]
    pub support: BTreeMap<String, u32>,
    /// 失败率是否被低体力误识别修正过
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub adjusted_false_scan: bool
}

impl TrainingStat {
    /// 按支援卡人头构造，人头总数自动计算
    pub fn new(failure: i32, support: &[(&str, u32)]) -> Self {
        let support: BTreeMap<_, _> = support.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        Self {
            failure,
            total_support: support.values().sum(),
            support,
            adjusted_false_scan: false
        }
    }

    /// 和训练类型相同的支援卡人头数(彩圈)
    pub fn rainbow_count(&self, train: TrainType) -> u32 {
        self.support.get(train.key()).copied().unwrap_or(0)
    }

    pub fn is_safe(&self, max_failure: i32) -> bool {
        self.failure <= max_failure
    }
}

/// 一个回合的所有训练，按训练类型排序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainingSnapshot {
    pub trainings: BTreeMap<TrainType, TrainingStat>
}

impl TrainingSnapshot {
    pub fn new(trainings: impl IntoIterator<Item = (TrainType, TrainingStat)>) -> Self {
        Self {
            trainings: trainings.into_iter().collect()
        }
    }

    pub fn get(&self, train: TrainType) -> Option<&TrainingStat> {
        self.trainings.get(&train)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TrainType, &TrainingStat)> {
        self.trainings.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.trainings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trainings.is_empty()
    }

    /// 只保留满足条件的训练
    pub fn filtered<F>(&self, f: F) -> Self
    where
        F: Fn(TrainType, &TrainingStat) -> bool
    {
        Self::new(self.iter().filter(|(k, v)| f(*k, v)).map(|(k, v)| (k, v.clone())))
    }

    /// 被修正过失败率的训练
    pub fn adjusted(&self) -> Vec<TrainType> {
        self.iter().filter(|(_, v)| v.adjusted_false_scan).map(|(k, _)| k).collect()
    }
}
