//! 事件选项评分
//!
//! 数据流：查询事件 -> 奖励归一化 ([`reward`]) + 文本模式提取 ([`pattern`])
//! -> 单个选项评分 ([`scorer`], 使用 [`cap_decay`]) -> 选择最优选项 ([`selector`])

pub mod cap_decay;
pub mod context;
pub mod pattern;
pub mod reward;
pub mod scorer;
pub mod selector;

pub use cap_decay::cap_decay;
pub use context::ScoringContext;
pub use reward::{RawReward, RewardKind, RewardRecord, normalize_rewards};
pub use scorer::{OptionScore, score_option};
pub use selector::{EventChoice, EventMatch, EventQuery, EventSource, ScoredOption, select_choice};
