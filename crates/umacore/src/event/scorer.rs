//! 单个事件选项的评分
//!
//! 评分顺序：
//! 1. 归一化奖励，从选项名里取概率
//! 2. good/bad result 文本标记
//! 3. 必须回避的状态直接否决
//! 4. 逐条奖励按概率加权累加
//! 5. 有坏结果时额外扣一点，打破平局
//!
//! 每一步都会追加一行明细，明细只用于调试，不影响分数。

use serde::Serialize;

use super::{
    RewardKind, ScoringContext, cap_decay,
    pattern::extract_chance,
    reward::{RawReward, RewardRecord, normalize_rewards}
};
use crate::gamedata::ScoringTable;

/// 选项得分和明细
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionScore {
    pub score: f64,
    pub details: Vec<String>
}

fn has_marker(records: &[RewardRecord], marker: &str) -> bool {
    records
        .iter()
        .any(|r| r.kind == RewardKind::Text && r.raw.to_lowercase().contains(marker))
}

/// 给一个选项打分
pub fn score_option(option_name: &str, rewards: &RawReward, ctx: &ScoringContext, table: &ScoringTable) -> OptionScore {
    let records = normalize_rewards(rewards);
    let prob = extract_chance(option_name).unwrap_or(table.assume_missing_chance_as);
    let mut score = 0.0;
    let mut details = vec![];

    let has_good = has_marker(&records, "good result");
    let has_bad = has_marker(&records, "bad result");
    if has_good {
        score += table.good_result_bonus;
        details.push(format!("{:+.1} good-result bonus", table.good_result_bonus));
    }
    if has_bad {
        score += table.bad_result_penalty;
        details.push(format!("{:.1} bad-result penalty", table.bad_result_penalty));
    }

    if !ctx.hard_avoid_statuses.is_empty() {
        let vetoed = records.iter().find_map(|r| match (&r.kind, &r.name) {
            (RewardKind::Status, Some(name)) if ctx.hard_avoid_statuses.contains(name) => Some(name),
            _ => None
        });
        if let Some(name) = vetoed {
            return OptionScore {
                score: table.hard_avoid_score,
                details: vec![format!("{:.0} hard-avoid status: {name}", table.hard_avoid_score)]
            };
        }
    }

    for record in &records {
        let (Some(name), value) = (record.name.as_deref(), record.value) else {
            continue;
        };
        match (record.kind, value) {
            (RewardKind::Energy, Some(v)) => {
                let mut mult = table.energy_point;
                if ctx.is_low_energy() {
                    mult *= ctx.low_energy_multiplier;
                    details.push(format!("(energy low bias x{:.2})", ctx.low_energy_multiplier));
                }
                let delta = v as f64 * mult * prob;
                score += delta;
                details.push(format!("{delta:+.1} Energy {v:+}"));
            }
            (RewardKind::SkillPoints, Some(v)) => {
                let delta = v as f64 * table.skill_points_point * prob;
                score += delta;
                details.push(format!("{delta:+.1} Skill points {v:+}"));
            }
            (RewardKind::Bond, Some(v)) => {
                let delta = v as f64 * table.bond_point * prob;
                score += delta;
                details.push(format!("{delta:+.1} Bond {v:+}"));
            }
            (RewardKind::Stat, Some(v)) => {
                let weight = table.stat_weight(name);
                let delta = if v < 0 {
                    v as f64 * weight * table.negative_stat_penalty_mult * prob
                } else {
                    cap_decay(name, v, ctx, table.cap_decay_strength) * weight * prob
                };
                score += delta;
                details.push(format!("{delta:+.1} {name} {v:+}"));
            }
            (RewardKind::Status, _) => {
                let delta = table.debuff_penalty(name) * prob;
                score += delta;
                details.push(format!("{delta:+.1} Status {name}"));
            }
            (RewardKind::Hint, Some(v)) => {
                if table.weight_hints {
                    let delta = v as f64 * table.hint_value(name) * prob;
                    score += delta;
                    details.push(format!("{delta:+.1} Hint {name} {v:+}"));
                } else {
                    details.push(format!("(hint {name} {v:+} not weighted)"));
                }
            }
            _ => {}
        }
    }

    if ctx.avoid_bad_result && has_bad && score > table.avoid_bad_floor {
        score += table.avoid_bad_nudge;
        details.push(format!("{:.1} extra avoid-bad nudge", table.avoid_bad_nudge));
    }

    OptionScore { score, details }
}
