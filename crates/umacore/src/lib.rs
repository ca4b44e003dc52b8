//! umacore - 事件选项评分与训练决策
//!
//! author: curran
//!
//! 两条互相独立的决策路径：
//! - [`event`]: 事件奖励归一化、选项评分、选择最优选项
//! - [`training`]: 根据训练失败率和支援卡人头选择训练或休息
pub mod event;
pub mod gamedata;
pub mod sensors;
pub mod training;
pub mod utils;
