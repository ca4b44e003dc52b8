use super::ScoringContext;

/// 属性上限衰减
///
/// 加上 `gain` 后超过上限的部分按 `exp(-decay_strength * over)` 折算，
/// 没超过上限的部分按原值计算。
/// 没有配置上限/当前值，或者 `gain <= 0` 时原样返回。
pub fn cap_decay(stat: &str, gain: i32, ctx: &ScoringContext, decay_strength: f64) -> f64 {
    if gain <= 0 {
        return gain as f64;
    }
    let (Some(cap), Some(current)) = (ctx.stat_caps.get(stat), ctx.current_stats.get(stat)) else {
        return gain as f64;
    };
    // 奖励数值可能接近 i32::MAX，用 i64 计算
    let over = (i64::from(*current) + i64::from(gain) - i64::from(*cap)).max(0);
    if over == 0 {
        return gain as f64;
    }
    let usable = i64::from(gain) - over;
    usable as f64 + over as f64 * (-decay_strength * over as f64).exp()
}
