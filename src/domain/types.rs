// ==========================================
// 针织车间停机统计系统 - 领域类型定义
// ==========================================
// 班次: 白班 day / 夜班 night
// 停机时长: 秒级精度,非负
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// 班次标签 (Shift Label)
// ==========================================
// 红线: 只接受精确小写 "day" / "night",其他一律拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftLabel {
    Day,   // 白班 06:00 - 17:30
    Night, // 夜班 17:30 - 次日 06:00
}

impl ShiftLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftLabel::Day => "day",
            ShiftLabel::Night => "night",
        }
    }
}

impl fmt::Display for ShiftLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 班次标签解析失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown shift label: {0:?}")]
pub struct UnknownShiftLabel(pub String);

impl FromStr for ShiftLabel {
    type Err = UnknownShiftLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(ShiftLabel::Day),
            "night" => Ok(ShiftLabel::Night),
            other => Err(UnknownShiftLabel(other.to_string())),
        }
    }
}

// ==========================================
// 停机时长 (Fault Duration)
// ==========================================
// 存储为整秒,构造即保证非负
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaultDuration(u64);

impl FaultDuration {
    pub const ZERO: FaultDuration = FaultDuration(0);

    pub fn from_secs(secs: u64) -> Self {
        FaultDuration(secs)
    }

    /// 溢出时饱和到 u64::MAX
    pub fn from_hms(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self::checked_from_hms(hours, minutes, seconds).unwrap_or(FaultDuration(u64::MAX))
    }

    /// 溢出时返回 None
    pub fn checked_from_hms(hours: u64, minutes: u64, seconds: u64) -> Option<Self> {
        let secs = hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(seconds)?;
        Some(FaultDuration(secs))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// 小时数（不舍入）
    pub fn as_hours(&self) -> f64 {
        self.0 as f64 / 3600.0
    }

    pub fn saturating_add(self, other: FaultDuration) -> FaultDuration {
        FaultDuration(self.0.saturating_add(other.0))
    }

    /// 解析 `H:MM:SS` 格式（小时可超过 24）
    ///
    /// # 返回
    /// - None: 段数不为 3、任一段非数字、分钟/秒 >= 60、折算秒数溢出
    pub fn parse_hms(s: &str) -> Option<Self> {
        let mut parts = s.trim().split(':');
        let hours = parts.next()?.trim().parse::<u64>().ok()?;
        let minutes = parts.next()?.trim().parse::<u64>().ok()?;
        let seconds = parts.next()?.trim().parse::<u64>().ok()?;
        if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
            return None;
        }
        Self::checked_from_hms(hours, minutes, seconds)
    }
}

impl fmt::Display for FaultDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        write!(f, "{:02}:{:02}:{:02}", h, m, s)
    }
}

impl std::iter::Sum for FaultDuration {
    fn sum<I: Iterator<Item = FaultDuration>>(iter: I) -> Self {
        iter.fold(FaultDuration::ZERO, FaultDuration::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_label_strict_parse() {
        assert_eq!("day".parse::<ShiftLabel>(), Ok(ShiftLabel::Day));
        assert_eq!("night".parse::<ShiftLabel>(), Ok(ShiftLabel::Night));
        // 大小写敏感,拼写错误不再落入夜班
        assert!("Day".parse::<ShiftLabel>().is_err());
        assert!("nigth".parse::<ShiftLabel>().is_err());
        assert!("".parse::<ShiftLabel>().is_err());

        let err = "swing".parse::<ShiftLabel>().unwrap_err();
        assert_eq!(err.to_string(), "unknown shift label: \"swing\"");
    }

    #[test]
    fn test_fault_duration_parse_and_display() {
        let d = FaultDuration::parse_hms("1:09:00").unwrap();
        assert_eq!(d.as_secs(), 4140);
        assert_eq!(d.to_string(), "01:09:00");

        // 累计时长可超过 24 小时
        let long = FaultDuration::parse_hms("27:00:05").unwrap();
        assert_eq!(long.as_secs(), 27 * 3600 + 5);
        assert_eq!(long.to_string(), "27:00:05");
    }

    #[test]
    fn test_fault_duration_parse_rejects_garbage() {
        assert!(FaultDuration::parse_hms("").is_none());
        assert!(FaultDuration::parse_hms("12:00").is_none());
        assert!(FaultDuration::parse_hms("-1:00:00").is_none());
        assert!(FaultDuration::parse_hms("00:61:00").is_none());
        assert!(FaultDuration::parse_hms("00:00:00:00").is_none());
        assert!(FaultDuration::parse_hms("aa:bb:cc").is_none());
    }

    #[test]
    fn test_fault_duration_parse_rejects_overflowing_hours() {
        // 小时列可解析为 u64,但折算秒数溢出
        assert!(FaultDuration::parse_hms("9999999999999999:00:00").is_none());
        assert!(FaultDuration::parse_hms("18446744073709551615:00:00").is_none());
        assert_eq!(FaultDuration::from_hms(u64::MAX, 0, 0).as_secs(), u64::MAX);
        assert_eq!(
            FaultDuration::checked_from_hms(1, 2, 3),
            Some(FaultDuration::from_secs(3723))
        );
    }

    #[test]
    fn test_fault_duration_sum() {
        let total: FaultDuration = [30, 45, 15]
            .into_iter()
            .map(FaultDuration::from_secs)
            .sum();
        assert_eq!(total.as_secs(), 90);
        assert!((FaultDuration::from_secs(5400).as_hours() - 1.5).abs() < 1e-12);
    }
}
