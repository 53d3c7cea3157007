// ==========================================
// 针织车间停机统计系统 - SQLite 故障事件源
// ==========================================
// 对齐: db::ensure_schema 中的 faults / fault_codes / operators 表
// 红线: 只读; visible = 0 的故障（已撤销）不参与任何报表
// ==========================================

use crate::db::DB_TIMESTAMP_FORMAT;
use crate::domain::{FaultDuration, FaultEvent, ShiftWindow, UNASSIGNED};
use crate::source::{EventSource, SourceError, SourceResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

const FETCH_SQL: &str = r#"
    SELECT
        f.machine_number,
        COALESCE(fc.description, CAST(f.fault_code AS TEXT)) AS fault_label,
        COALESCE(o.name, ?4) AS operator_name,
        f.date,
        f.fault_time
    FROM faults f
    LEFT JOIN fault_codes fc ON f.fault_code = fc.code
    LEFT JOIN operators o ON f.operator_code = o.code
    WHERE f.date >= ?1 AND f.date < ?2
      AND f.visible = 1
      AND (?3 IS NULL OR f.machine_number = ?3)
    ORDER BY f.date ASC, f.id ASC
"#;

// ==========================================
// SqliteEventSource
// ==========================================
pub struct SqliteEventSource {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEventSource {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl EventSource for SqliteEventSource {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[instrument(skip(self, window), fields(start = %window.start, end = %window.end))]
    fn fetch(&self, window: &ShiftWindow, machine: Option<u32>) -> SourceResult<Vec<FaultEvent>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SourceError::Unavailable(format!("数据库锁获取失败: {}", e)))?;

        let start = window.start.format(DB_TIMESTAMP_FORMAT).to_string();
        let end = window.end.format(DB_TIMESTAMP_FORMAT).to_string();

        let mut stmt = conn.prepare(FETCH_SQL)?;
        let rows = stmt.query_map(params![start, end, machine, UNASSIGNED], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut events = Vec::new();
        for (idx, row) in rows.enumerate() {
            let (machine_number, fault_label, operator, raw_date, fault_secs) = row?;

            // 库内数据经校验写入,出现异常值说明数据被外部篡改,直接中止
            let machine_number = u32::try_from(machine_number)
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| SourceError::MalformedRecord {
                    line: idx + 1,
                    message: format!("machine_number={}", machine_number),
                })?;
            let fault_secs = u64::try_from(fault_secs).map_err(|_| SourceError::MalformedRecord {
                line: idx + 1,
                message: format!("fault_time={}", fault_secs),
            })?;
            let occurred_at = NaiveDateTime::parse_from_str(&raw_date, DB_TIMESTAMP_FORMAT)
                .map_err(|_| SourceError::MalformedRecord {
                    line: idx + 1,
                    message: format!("date={}", raw_date),
                })?;

            events.push(FaultEvent {
                machine_number,
                fault_label,
                operator,
                occurred_at: Some(occurred_at),
                duration: FaultDuration::from_secs(fault_secs),
            });
        }

        debug!(count = events.len(), "故障事件查询完成");
        Ok(events)
    }
}
