//! 训练决策
//!
//! 每回合从识别结果构造 [`TrainingSnapshot`]，由 [`TrainingPolicy`] 选出一个训练或者休息。

pub mod calendar;
pub mod decision;
pub mod snapshot;

pub use calendar::{GameCalendar, in_june_window};
pub use decision::{TrainingDecision, TrainingPolicy};
pub use snapshot::{TrainingSnapshot, TrainingStat};
