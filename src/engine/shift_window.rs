// ==========================================
// 针织车间停机统计系统 - 班次时间窗解析器
// ==========================================
// 白班: 当日 06:00:00 - 当日 17:30:00, 设计 11.5 小时
// 夜班: 当日 17:30:00 - 次日 06:00:00, 设计 12.5 小时
// 进行中班次: 有效时长截至 now
// 红线: 纯函数,无副作用; 白班起点统一为 06:00:00
// ==========================================

use crate::domain::{ShiftLabel, ShiftWindow};
use crate::engine::error::{EngineError, EngineResult};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// 请求参数中的日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// 班次边界
const DAY_START: NaiveTime = shift_boundary(6, 0);
const SHIFT_CHANGE: NaiveTime = shift_boundary(17, 30);

/// 编译期构造班次边界时刻,非法时刻直接编译失败
const fn shift_boundary(hour: u32, minute: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(t) => t,
        None => panic!("invalid shift boundary"),
    }
}

// ==========================================
// ShiftWindowResolver
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftWindowResolver;

impl ShiftWindowResolver {
    pub fn new() -> Self {
        Self
    }

    /// 解析请求参数中的日期与班次
    ///
    /// # 返回
    /// - Err(InvalidDateFormat): 日期不是 yyyy-MM-dd
    /// - Err(InvalidShiftLabel): 班次不是 "day" / "night"
    pub fn resolve(&self, date: &str, shift: &str, now: NaiveDateTime) -> EngineResult<ShiftWindow> {
        let date = parse_date(date)?;
        let shift = parse_shift(shift)?;
        Ok(self.resolve_parsed(date, shift, now))
    }

    /// 已解析参数的时间窗计算
    pub fn resolve_parsed(&self, date: NaiveDate, shift: ShiftLabel, now: NaiveDateTime) -> ShiftWindow {
        let (start, end) = match shift {
            ShiftLabel::Day => (at(date, DAY_START), at(date, SHIFT_CHANGE)),
            ShiftLabel::Night => (at(date, SHIFT_CHANGE), at(date + Duration::days(1), DAY_START)),
        };

        let nominal_hours = hours_between(start, end);
        // 严格处于班次内部才截断（now == start 时有效时长为 0,不截断）
        let effective_hours = if now > start && now < end {
            hours_between(start, now)
        } else {
            nominal_hours
        };

        ShiftWindow {
            date,
            shift,
            start,
            end,
            nominal_hours,
            effective_hours,
        }
    }
}

pub fn parse_date(date: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| EngineError::InvalidDateFormat(date.to_string()))
}

pub fn parse_shift(shift: &str) -> EngineResult<ShiftLabel> {
    shift
        .parse::<ShiftLabel>()
        .map_err(|e| EngineError::InvalidShiftLabel(e.0))
}

fn at(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}
