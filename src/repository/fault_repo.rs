// ==========================================
// 针织车间停机统计系统 - 故障记录仓储（写侧）
// ==========================================
// 职责: 机台推送故障入库 / 撤销故障 / 故障码查询
// 红线: Repository 不含业务逻辑; 撤销为软删除（visible = 0）
// ==========================================

use crate::db::DB_TIMESTAMP_FORMAT;
use crate::domain::FaultLogLine;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// FaultRepository
// ==========================================
pub struct FaultRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FaultRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入一行故障日志
    ///
    /// 同一事务内: 故障码描述 UPSERT → 挡车工姓名 UPSERT → 插入可见故障
    ///
    /// # 返回
    /// - Ok(i64): 新故障记录 id
    pub fn insert_log_line(&self, line: &FaultLogLine) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO fault_codes (code, description) VALUES (?1, ?2)
             ON CONFLICT(code) DO UPDATE SET description = excluded.description",
            params![line.fault_code, line.fault_description],
        )?;
        tx.execute(
            "INSERT INTO operators (code, name) VALUES (?1, ?2)
             ON CONFLICT(code) DO UPDATE SET name = excluded.name",
            params![line.operator_code, line.operator_name],
        )?;
        tx.execute(
            r#"
            INSERT INTO faults (date, machine_number, fault_code, operator_code, fault_time, visible)
            VALUES (?1, ?2, ?3, ?4, ?5, 1)
            "#,
            params![
                line.occurred_at.format(DB_TIMESTAMP_FORMAT).to_string(),
                line.machine_number,
                line.fault_code,
                line.operator_code,
                i64::try_from(line.duration.as_secs()).map_err(|_| RepositoryError::FieldValueError {
                    field: "fault_time".to_string(),
                    message: line.duration.to_string(),
                })?,
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(id)
    }

    /// 撤销故障（按精确时间戳 + 机台）
    ///
    /// # 返回
    /// - Ok(usize): 被隐藏的记录数（0 表示无匹配）
    pub fn remove_fault(&self, occurred_at: NaiveDateTime, machine_number: u32) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE faults SET visible = 0 WHERE date = ?1 AND machine_number = ?2 AND visible = 1",
            params![occurred_at.format(DB_TIMESTAMP_FORMAT).to_string(), machine_number],
        )?;
        Ok(affected)
    }

    /// 全部故障码
    pub fn fault_codes(&self) -> RepositoryResult<BTreeMap<i64, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT code, description FROM fault_codes ORDER BY code")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;

        let mut codes = BTreeMap::new();
        for row in rows {
            let (code, description) = row?;
            codes.insert(code, description);
        }
        Ok(codes)
    }
}
