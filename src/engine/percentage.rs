// ==========================================
// 针织车间停机统计系统 - 百分比与舍入引擎
// ==========================================
// 开机率 = (有效班时秒 - 停机秒) / 有效班时秒 × 100
// 占比   = 分项 / 合计 × 100; 合计为 0 时固定返回 100
// 舍入: 一位小数 half-up, 只在输出百分比时执行一次
// ==========================================

use crate::domain::FaultDuration;
use crate::engine::error::{EngineError, EngineResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// 输出百分比保留的小数位
pub const PERCENT_DECIMALS: u32 = 1;

/// 零合计时的占比（零停机机台定义为"零合计的 100%"）
pub const ZERO_TOTAL_SHARE: f64 = 100.0;

// ==========================================
// PercentageEngine
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct PercentageEngine;

impl PercentageEngine {
    pub fn new() -> Self {
        Self
    }

    /// 开机率（已舍入）
    ///
    /// 停机超过有效班时（进行中班次的长停机）时结果为负,不截断
    ///
    /// # 返回
    /// - Err(ShiftNotStarted): effective_hours <= 0
    pub fn uptime_percent(&self, effective_hours: f64, total_down: FaultDuration) -> EngineResult<f64> {
        if !(effective_hours > 0.0) {
            return Err(EngineError::ShiftNotStarted(effective_hours));
        }
        let shift_secs = effective_hours * 3600.0;
        let raw = (shift_secs - total_down.as_secs() as f64) / shift_secs * 100.0;
        Ok(round_half_up(raw, PERCENT_DECIMALS))
    }

    /// 占比（已舍入）
    pub fn share_percent(&self, part: f64, whole: f64) -> f64 {
        if whole == 0.0 {
            return ZERO_TOTAL_SHARE;
        }
        round_half_up(part / whole * 100.0, PERCENT_DECIMALS)
    }
}

/// half-up 舍入到 dp 位小数
///
/// 先取 f64 的最短十进制表示再做十进制舍入,
/// 避免 1.45 这类值因二进制误差被舍成 1.4
pub fn round_half_up(value: f64, dp: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let decimal = value
        .to_string()
        .parse::<Decimal>()
        .or_else(|_| Decimal::try_from(value));
    match decimal {
        Ok(d) => d
            .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
            .to_f64()
            .unwrap_or(value),
        Err(_) => value,
    }
}
