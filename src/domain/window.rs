// ==========================================
// 针织车间停机统计系统 - 班次时间窗
// ==========================================
// 由 ShiftWindowResolver 生成,只读
// 红线: end > start; effective_hours <= nominal_hours
// ==========================================

use crate::domain::types::ShiftLabel;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub date: NaiveDate,        // 班次所属日期（夜班为开班当天）
    pub shift: ShiftLabel,
    pub start: NaiveDateTime,   // 含
    pub end: NaiveDateTime,     // 不含
    pub nominal_hours: f64,     // 设计班时 11.5 / 12.5
    pub effective_hours: f64,   // 进行中班次 = 已过时长
}

impl ShiftWindow {
    /// 时间戳是否落在 [start, end)
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts < self.end
    }

    /// 班次是否仍在进行（有效时长被截断）
    pub fn in_progress(&self) -> bool {
        self.effective_hours < self.nominal_hours
    }

    /// 窗口覆盖的自然日（按日落盘的日志文件需要逐日读取）
    pub fn calendar_dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut day = self.start.date();
        // end 恰为零点时不包含该日
        let last = if self.end.time() == chrono::NaiveTime::MIN {
            self.end.date().pred_opt().unwrap_or(self.end.date())
        } else {
            self.end.date()
        };
        while day <= last {
            dates.push(day);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        dates
    }
}
