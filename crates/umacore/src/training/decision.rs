//! 训练决策策略
//!
//! 每回合按顺序执行：
//! 1. 低体力误识别修正 - 低体力时大部分训练失败率很高而个别很低，视为识别错误
//! 2. 属性上限过滤 - 已达上限的属性不再训练
//! 3. 六月体力策略 - 六月上下旬体力不足时只接受双彩圈，否则休息
//! 4. 第一年选人头最多的训练，之后优先彩圈训练，没有彩圈再选人头最多的训练

use std::{cmp::Reverse, fmt::Display};

use hashbrown::HashMap;
use log::{debug, info};

use super::{TrainingSnapshot, TrainingStat, in_june_window};
use crate::{
    gamedata::{BotConfig, DEFAULT_STAT_CAP, TrainType},
    sensors::TurnState
};

/// 六月体力策略的体力阈值下限，和休息阈值取大
const JUNE_ENERGY_FLOOR: i32 = 60;

/// 六月体力不足时至少需要的彩圈数
const JUNE_MIN_RAINBOW: u32 = 2;

/// 其他训练都不安全时，智力训练至少需要的人头数
const WIT_MIN_SUPPORT: u32 = 2;

/// 误识别修正至少需要的高失败率训练数
const FALSE_SCAN_MIN_HIGH: usize = 2;

/// 不在优先列表里的属性
const LOWEST_PRIORITY: usize = 999;

/// 决策结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingDecision {
    Train(TrainType),
    Rest
}

impl TrainingDecision {
    pub fn train(&self) -> Option<TrainType> {
        match self {
            Self::Train(t) => Some(*t),
            Self::Rest => None
        }
    }
}

impl From<Option<TrainType>> for TrainingDecision {
    fn from(value: Option<TrainType>) -> Self {
        value.map_or(Self::Rest, Self::Train)
    }
}

impl Display for TrainingDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Train(t) => write!(f, "训练 {t}"),
            Self::Rest => write!(f, "休息")
        }
    }
}

/// 训练选择策略
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingPolicy {
    /// 属性优先顺序，越靠前越优先
    pub priority_stat: Vec<TrainType>,
    /// 可接受的最大失败率
    pub max_failure: i32,
    /// 属性上限
    pub stat_caps: HashMap<TrainType, i32>,
    /// 低体力阈值
    pub rest_trigger: i32,
    /// 误识别修正时不参与统计的训练
    pub false_scan_exclude: Vec<TrainType>
}

impl Default for TrainingPolicy {
    fn default() -> Self {
        Self::new(&BotConfig::default())
    }
}

impl TrainingPolicy {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            priority_stat: config.priority_stat.clone(),
            max_failure: config.maximum_failure,
            stat_caps: config.stat_caps.clone(),
            rest_trigger: config.energy_rest_threshold,
            false_scan_exclude: config.false_scan_exclude.clone()
        }
    }

    pub fn with_max_failure(mut self, max_failure: i32) -> Self {
        self.max_failure = max_failure;
        self
    }

    pub fn with_priority(mut self, priority: &[TrainType]) -> Self {
        self.priority_stat = priority.to_vec();
        self
    }

    pub fn with_stat_cap(mut self, train: TrainType, cap: i32) -> Self {
        self.stat_caps.insert(train, cap);
        self
    }

    pub fn with_rest_trigger(mut self, rest_trigger: i32) -> Self {
        self.rest_trigger = rest_trigger;
        self
    }

    /// 优先级序号，越小越优先
    pub fn stat_priority(&self, train: TrainType) -> usize {
        self.priority_stat
            .iter()
            .position(|t| *t == train)
            .unwrap_or(LOWEST_PRIORITY)
    }

    pub fn stat_cap(&self, train: TrainType) -> i32 {
        self.stat_caps.get(&train).copied().unwrap_or(DEFAULT_STAT_CAP)
    }

    /// 按 (value, 优先级) 取最大，完全相同时保留先出现的
    ///
    /// 快照按 `TrainType` 顺序 (spd, sta, pwr, guts, wit) 遍历，与识别顺序无关，
    /// 所以只有两个训练都不在 `priority_stat` 里时才会按这个顺序决定。
    fn pick_best<'a, I, F>(&self, candidates: I, value: F) -> Option<(TrainType, &'a TrainingStat)>
    where
        I: IntoIterator<Item = (TrainType, &'a TrainingStat)>,
        F: Fn(TrainType, &TrainingStat) -> u32
    {
        let mut best: Option<(TrainType, &TrainingStat, (u32, Reverse<usize>))> = None;
        for (train, stat) in candidates {
            let key = (value(train, stat), Reverse(self.stat_priority(train)));
            if best.as_ref().is_none_or(|(_, _, k)| key > *k) {
                best = Some((train, stat, key));
            }
        }
        best.map(|(train, stat, _)| (train, stat))
    }

    /// 低体力误识别修正
    ///
    /// 体力不高于 `rest_trigger` 时，如果至少一半(至少2个)训练的失败率超过阈值而还有训练不超过阈值，
    /// 把低的那些改成观察到的最高失败率并打上标记。返回修正后的副本，不修改输入。
    pub fn correct_false_scan(&self, snapshot: &TrainingSnapshot, energy: i32) -> TrainingSnapshot {
        let mut corrected = snapshot.clone();
        if energy > self.rest_trigger {
            return corrected;
        }
        let failures: Vec<_> = snapshot
            .iter()
            .filter(|(train, stat)| !self.false_scan_exclude.contains(train) && stat.failure >= 0)
            .map(|(train, stat)| (train, stat.failure))
            .collect();
        if failures.is_empty() {
            return corrected;
        }
        let (above, below): (Vec<_>, Vec<_>) = failures.iter().partition(|(_, f)| *f > self.max_failure);
        let needed = FALSE_SCAN_MIN_HIGH.max(failures.len().div_ceil(2));
        let Some(hi_max) = above.iter().map(|(_, f)| *f).max() else {
            return corrected;
        };
        if above.len() >= needed && !below.is_empty() {
            for (train, _) in &below {
                if let Some(stat) = corrected.trainings.get_mut(train) {
                    stat.failure = hi_max;
                    stat.adjusted_false_scan = true;
                }
            }
            let names: Vec<_> = below.iter().map(|(t, _)| t.to_string()).collect();
            info!("低体力 ({energy}%)，识别到失败率异常 -> {} 修正为 {hi_max}%", names.join(", "));
        }
        corrected
    }

    /// 去掉属性已达上限的训练
    pub fn filter_by_stat_caps(&self, snapshot: &TrainingSnapshot, turn: &TurnState) -> TrainingSnapshot {
        snapshot.filtered(|train, _| turn.stat(train) < self.stat_cap(train))
    }

    /// 安全且至少双彩圈的训练
    pub fn find_safe_double_rainbow(&self, snapshot: &TrainingSnapshot) -> Option<TrainType> {
        let candidates = snapshot
            .iter()
            .filter(|(train, stat)| stat.is_safe(self.max_failure) && stat.rainbow_count(*train) >= JUNE_MIN_RAINBOW);
        self.pick_best(candidates, |train, stat| stat.rainbow_count(train))
            .map(|(train, _)| train)
    }

    /// 人头最多的安全训练，用于第一年和没有彩圈的时候
    pub fn most_support_card(&self, snapshot: &TrainingSnapshot) -> Option<TrainType> {
        let others_unsafe = !snapshot
            .iter()
            .any(|(train, stat)| train != TrainType::Wit && stat.is_safe(self.max_failure));
        if others_unsafe
            && let Some(wit) = snapshot.get(TrainType::Wit)
            && wit.is_safe(self.max_failure)
            && wit.total_support >= WIT_MIN_SUPPORT
        {
            info!("其他训练都不安全，智力训练安全且有 {} 个人头", wit.total_support);
            return Some(TrainType::Wit);
        }

        let safe = snapshot.iter().filter(|(_, stat)| stat.is_safe(self.max_failure));
        let Some((train, stat)) = self.pick_best(safe, |_, stat| stat.total_support) else {
            info!("没有安全的训练，失败率都太高");
            return None;
        };

        if stat.total_support <= 1 {
            if stat.failure != 0 {
                info!("最好的训练只有 {} 个人头，选择休息", stat.total_support);
                return None;
            }
            if train == TrainType::Wit {
                info!("只有1个人头的智力训练，跳过");
                return None;
            }
            info!("只有1个人头但失败率为0，按优先级选择 {train}");
            return Some(train);
        }

        info!(
            "人头最多的训练: {train}, {} 个人头, 失败率 {}%",
            stat.total_support, stat.failure
        );
        Some(train)
    }

    /// 彩圈最多的安全训练
    pub fn rainbow_training(&self, snapshot: &TrainingSnapshot) -> Option<TrainType> {
        let candidates = snapshot
            .iter()
            .filter(|(train, stat)| stat.is_safe(self.max_failure) && stat.rainbow_count(*train) > 0);
        let Some((train, stat)) = self.pick_best(candidates, |train, stat| stat.rainbow_count(train)) else {
            info!("没有失败率可接受的彩圈训练");
            return None;
        };
        info!(
            "彩圈训练: {train}, {} 个彩圈, 失败率 {}%",
            stat.rainbow_count(train),
            stat.failure
        );
        Some(train)
    }

    /// 本回合的决策
    pub fn decide(&self, snapshot: &TrainingSnapshot, turn: &TurnState) -> TrainingDecision {
        debug!("当前属性: {:?}, 体力: {}%", turn.stats, turn.energy);

        let corrected = self.correct_false_scan(snapshot, turn.energy);
        for train in corrected.adjusted() {
            if let Some(stat) = corrected.get(train) {
                debug!("{train} 失败率修正为 {}% (低体力误识别)", stat.failure);
            }
        }

        let filtered = self.filter_by_stat_caps(&corrected, turn);
        if filtered.is_empty() {
            info!("所有属性已达上限或者没有可用训练");
            return TrainingDecision::Rest;
        }

        if in_june_window(turn.calendar.as_ref()) && turn.energy < self.rest_trigger.max(JUNE_ENERGY_FLOOR) {
            return match self.find_safe_double_rainbow(&filtered) {
                Some(train) => {
                    let stat = filtered.get(train).cloned().unwrap_or_default();
                    info!(
                        "六月体力策略: 选择双彩圈训练 {train}, {} 个彩圈, 失败率 {}%",
                        stat.rainbow_count(train),
                        stat.failure
                    );
                    TrainingDecision::Train(train)
                }
                None => {
                    info!("六月体力策略: 没有安全的双彩圈训练，休息");
                    TrainingDecision::Rest
                }
            };
        }

        if turn.year.contains("Junior Year") {
            return self.most_support_card(&filtered).into();
        }
        match self.rainbow_training(&filtered) {
            Some(train) => TrainingDecision::Train(train),
            None => {
                info!("没有彩圈训练，改为选择人头最多的训练");
                self.most_support_card(&filtered).into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::GameCalendar;

    use TrainType::*;

    fn policy() -> TrainingPolicy {
        TrainingPolicy::default()
            .with_max_failure(9)
            .with_priority(&[Speed, Power, Stamina, Guts, Wit])
            .with_rest_trigger(30)
    }

    fn turn(year: &str, energy: i32) -> TurnState {
        TurnState {
            year: year.to_string(),
            energy,
            ..Default::default()
        }
    }

    fn snapshot(items: &[(TrainType, TrainingStat)]) -> TrainingSnapshot {
        TrainingSnapshot::new(items.iter().cloned())
    }

    fn fail_only(failure: i32) -> TrainingStat {
        TrainingStat::new(failure, &[])
    }

    fn with_total(failure: i32, total: u32) -> TrainingStat {
        TrainingStat {
            failure,
            total_support: total,
            ..Default::default()
        }
    }

    #[test]
    fn test_stat_priority() {
        let p = policy().with_priority(&[Power, Speed]);
        assert_eq!(p.stat_priority(Power), 0);
        assert_eq!(p.stat_priority(Speed), 1);
        assert_eq!(p.stat_priority(Wit), LOWEST_PRIORITY);
    }

    #[test]
    fn test_false_scan_majority() {
        let s = snapshot(&[(Speed, fail_only(50)), (Stamina, fail_only(55)), (Power, fail_only(2))]);
        let corrected = policy().correct_false_scan(&s, 20);
        assert_eq!(corrected.get(Power).map(|x| x.failure), Some(55));
        assert_eq!(corrected.adjusted(), vec![Power]);
        assert_eq!(corrected.get(Speed).map(|x| x.failure), Some(50));
        // 输入不被修改
        assert_eq!(s.get(Power).map(|x| x.failure), Some(2));
        assert!(s.adjusted().is_empty());
    }

    #[test]
    fn test_false_scan_skipped() {
        let s = snapshot(&[(Speed, fail_only(50)), (Stamina, fail_only(55)), (Power, fail_only(2))]);
        // 体力足够
        assert_eq!(policy().correct_false_scan(&s, 31), s);

        // 只有一个高失败率
        let s = snapshot(&[(Speed, fail_only(50)), (Stamina, fail_only(3)), (Power, fail_only(2))]);
        assert_eq!(policy().correct_false_scan(&s, 10), s);

        // 全部都高，没有可疑的低值
        let s = snapshot(&[(Speed, fail_only(50)), (Stamina, fail_only(30))]);
        assert_eq!(policy().correct_false_scan(&s, 10), s);

        // 智力不参与统计也不被修正，识别失败的 -1 也不参与
        let s = snapshot(&[
            (Speed, fail_only(40)),
            (Stamina, fail_only(45)),
            (Guts, fail_only(-1)),
            (Wit, fail_only(0))
        ]);
        assert_eq!(policy().correct_false_scan(&s, 10), s);
    }

    #[test]
    fn test_false_scan_needs_half() {
        // 5个训练需要3个高失败率
        let s = snapshot(&[
            (Speed, fail_only(40)),
            (Stamina, fail_only(45)),
            (Power, fail_only(1)),
            (Guts, fail_only(2)),
            (Wit, fail_only(3))
        ]);
        let p = TrainingPolicy {
            false_scan_exclude: vec![],
            ..policy()
        };
        assert_eq!(p.correct_false_scan(&s, 10), s);

        // 4个训练需要2个
        let s = snapshot(&[
            (Speed, fail_only(40)),
            (Stamina, fail_only(45)),
            (Power, fail_only(1)),
            (Guts, fail_only(2))
        ]);
        let corrected = policy().correct_false_scan(&s, 10);
        assert_eq!(corrected.get(Power).map(|x| x.failure), Some(45));
        assert_eq!(corrected.get(Guts).map(|x| x.failure), Some(45));
        assert_eq!(corrected.adjusted(), vec![Power, Guts]);
    }

    #[test]
    fn test_most_support_card() {
        let p = policy();
        let s = snapshot(&[(Speed, with_total(5, 3)), (Wit, with_total(0, 1))]);
        assert_eq!(p.most_support_card(&s), Some(Speed));

        // 只有1个人头的智力训练不选
        let s = snapshot(&[(Wit, with_total(0, 1))]);
        assert_eq!(p.most_support_card(&s), None);

        // 其他训练都不安全时选有2个人头的智力
        let s = snapshot(&[(Speed, with_total(20, 4)), (Wit, with_total(3, 2))]);
        assert_eq!(p.most_support_card(&s), Some(Wit));

        // 1个人头、失败率0的非智力训练
        let s = snapshot(&[(Guts, with_total(0, 1)), (Power, with_total(0, 1))]);
        assert_eq!(p.most_support_card(&s), Some(Power));

        // 1个人头但有失败率
        let s = snapshot(&[(Guts, with_total(4, 1))]);
        assert_eq!(p.most_support_card(&s), None);

        // 没有安全训练
        let s = snapshot(&[(Guts, with_total(40, 5))]);
        assert_eq!(p.most_support_card(&s), None);
    }

    #[test]
    fn test_most_support_card_ties() {
        let p = policy();
        let s = snapshot(&[(Stamina, with_total(0, 3)), (Power, with_total(0, 3)), (Guts, with_total(0, 2))]);
        assert_eq!(p.most_support_card(&s), Some(Power));

        // 都不在优先列表里时保留先出现的
        let p = policy().with_priority(&[]);
        assert_eq!(p.most_support_card(&s), Some(Stamina));

        // 先出现指的是训练类型顺序，和构造顺序无关
        let s = snapshot(&[(Guts, with_total(0, 3)), (Power, with_total(0, 3))]);
        assert_eq!(p.most_support_card(&s), Some(Power));
    }

    #[test]
    fn test_rainbow_training() {
        let p = policy();
        let s = snapshot(&[
            (Speed, TrainingStat::new(3, &[("spd", 1), ("pwr", 2)])),
            (Power, TrainingStat::new(3, &[("pwr", 2)])),
            (Guts, TrainingStat::new(30, &[("guts", 3)]))
        ]);
        assert_eq!(p.rainbow_training(&s), Some(Power));

        let s = snapshot(&[(Speed, TrainingStat::new(3, &[("pwr", 3)]))]);
        assert_eq!(p.rainbow_training(&s), None);
    }

    #[test]
    fn test_decide_by_year() {
        let p = policy();
        let s = snapshot(&[
            (Speed, TrainingStat::new(3, &[("spd", 1)])),
            (Power, TrainingStat::new(3, &[("spd", 1), ("guts", 1), ("friend", 1)]))
        ]);
        // 第一年选人头最多
        assert_eq!(p.decide(&s, &turn("Junior Year Late Sep", 80)), TrainingDecision::Train(Power));
        // 之后选彩圈
        assert_eq!(p.decide(&s, &turn("Classic Year Late Sep", 80)), TrainingDecision::Train(Speed));
    }

    #[test]
    fn test_decide_rainbow_falls_back() {
        let p = policy();
        let s = snapshot(&[
            (Speed, TrainingStat::new(3, &[("pwr", 1)])),
            (Power, TrainingStat::new(3, &[("spd", 1), ("guts", 1)]))
        ]);
        assert_eq!(p.decide(&s, &turn("Senior Year Early Mar", 80)), TrainingDecision::Train(Power));
    }

    #[test]
    fn test_decide_stat_caps() {
        let p = policy().with_stat_cap(Speed, 600);
        let s = snapshot(&[(Speed, TrainingStat::new(0, &[("spd", 3)])), (Power, TrainingStat::new(0, &[("pwr", 1)]))]);
        let mut t = turn("Classic Year Early May", 80);
        t.stats = [(Speed, 600), (Power, 1199)].into_iter().collect();
        assert_eq!(p.decide(&s, &t), TrainingDecision::Train(Power));

        t.stats.insert(Power, 1200);
        assert_eq!(p.decide(&s, &t), TrainingDecision::Rest);
    }

    #[test]
    fn test_decide_june_window() {
        let p = policy();
        let s = snapshot(&[
            (Speed, TrainingStat::new(3, &[("spd", 1), ("friend", 2)])),
            (Power, TrainingStat::new(3, &[("pwr", 2)])),
            (Guts, TrainingStat::new(3, &[("guts", 2)]))
        ]);
        let mut t = turn("Classic Year Early Jun", 50);
        t.calendar = Some(GameCalendar::new("Jun", 1));
        assert_eq!(p.decide(&s, &t), TrainingDecision::Train(Power));

        // 没有双彩圈就休息，不回退到其他策略
        let single = snapshot(&[(Speed, TrainingStat::new(0, &[("spd", 1), ("friend", 3)]))]);
        assert_eq!(p.decide(&single, &t), TrainingDecision::Rest);

        // 体力足够时正常训练
        t.energy = 60;
        assert_eq!(p.decide(&single, &t), TrainingDecision::Train(Speed));

        // 六月中旬不启用
        t.energy = 50;
        t.calendar = Some(GameCalendar::new("Jun", 3));
        assert_eq!(p.decide(&single, &t), TrainingDecision::Train(Speed));

        // 读不到日历时不启用
        t.calendar = None;
        assert_eq!(p.decide(&single, &t), TrainingDecision::Train(Speed));
    }

    #[test]
    fn test_decide_uses_corrected_failures() {
        let p = policy();
        let s = snapshot(&[
            (Speed, TrainingStat::new(50, &[("spd", 2)])),
            (Stamina, TrainingStat::new(55, &[("sta", 2)])),
            (Power, TrainingStat::new(2, &[("pwr", 2)]))
        ]);
        // 修正后没有安全的训练
        assert_eq!(p.decide(&s, &turn("Classic Year Early Apr", 20)), TrainingDecision::Rest);
        // 体力足够时不修正
        assert_eq!(p.decide(&s, &turn("Classic Year Early Apr", 80)), TrainingDecision::Train(Power));
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(TrainingDecision::from(Some(Guts)).to_string(), "训练 GUTS");
        assert_eq!(TrainingDecision::from(None), TrainingDecision::Rest);
        assert_eq!(TrainingDecision::Rest.train(), None);
    }
}
