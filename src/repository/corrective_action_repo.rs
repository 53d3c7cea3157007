// ==========================================
// 针织车间停机统计系统 - 纠正措施仓储
// ==========================================
// 键: (日期, 机台, 是否白班, 故障码)
// 红线: 批量保存在同一事务内逐行先删后插; 任一故障描述查无故障码则整批回滚
// ==========================================

use crate::db::{DB_DATE_FORMAT, DB_TIMESTAMP_FORMAT};
use crate::domain::{ActionListItem, CorrectiveAction, CorrectiveActionInput};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 待办列表中的日期格式
pub const ACTION_LIST_DATE_FORMAT: &str = "%d/%m/%Y";

pub struct CorrectiveActionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CorrectiveActionRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量保存纠正措施
    ///
    /// # 返回
    /// - Ok(usize): 写入行数
    /// - Err(NotFound): 某个故障描述没有对应故障码（整批未写入）
    pub fn save(
        &self,
        date: NaiveDate,
        machine_number: u32,
        is_day_shift: bool,
        actions: &[CorrectiveActionInput],
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let date = date.format(DB_DATE_FORMAT).to_string();

        let mut written = 0;
        for input in actions {
            let fault_code = lookup_fault_code(&tx, &input.fault)?
                .ok_or_else(|| RepositoryError::not_found("fault_code", &input.fault))?;

            tx.execute(
                r#"
                DELETE FROM corrective_actions
                WHERE date = ?1 AND machine_number = ?2 AND isdayshift = ?3 AND fault_code = ?4
                "#,
                params![date, machine_number, is_day_shift, fault_code],
            )?;
            written += tx.execute(
                r#"
                INSERT INTO corrective_actions (date, machine_number, isdayshift, fault_code, observation, action)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![date, machine_number, is_day_shift, fault_code, input.observation, input.action],
            )?;
        }

        // 提前返回时 tx 被 drop,自动回滚
        tx.commit()?;
        Ok(written)
    }

    /// 查询未完成的纠正措施
    ///
    /// # 返回
    /// - Ok(Some): 找到未完成记录
    /// - Ok(None): 没有未完成记录
    /// - Err(NotFound): 故障描述没有对应故障码
    pub fn get_open(
        &self,
        date: NaiveDate,
        machine_number: u32,
        is_day_shift: bool,
        fault: &str,
    ) -> RepositoryResult<Option<CorrectiveAction>> {
        let conn = self.get_conn()?;
        let fault_code =
            lookup_fault_code(&conn, fault)?.ok_or_else(|| RepositoryError::not_found("fault_code", fault))?;

        let action = conn
            .query_row(
                r#"
                SELECT id, observation, action FROM corrective_actions
                WHERE date = ?1 AND machine_number = ?2 AND isdayshift = ?3 AND fault_code = ?4
                  AND completed = 0
                ORDER BY id DESC
                LIMIT 1
                "#,
                params![
                    date.format(DB_DATE_FORMAT).to_string(),
                    machine_number,
                    is_day_shift,
                    fault_code
                ],
                |row| {
                    Ok(CorrectiveAction {
                        id: row.get(0)?,
                        observation: row.get(1)?,
                        action: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(action)
    }

    /// 全部未完成措施,按日期升序
    pub fn list_open(&self) -> RepositoryResult<Vec<ActionListItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, date, machine_number, isdayshift, fault_code, observation, action
            FROM corrective_actions
            WHERE completed = 0
            ORDER BY date ASC, id ASC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut items = Vec::new();
        for row in rows {
            let (id, raw_date, machine_number, isdayshift, fault_code, observation, action) = row?;
            let date = NaiveDate::parse_from_str(&raw_date, DB_DATE_FORMAT).map_err(|_| {
                RepositoryError::FieldValueError {
                    field: "date".to_string(),
                    message: format!("id={} date={}", id, raw_date),
                }
            })?;
            items.push(ActionListItem {
                id,
                date: date.format(ACTION_LIST_DATE_FORMAT).to_string(),
                machine_number,
                isdayshift,
                fault_code,
                observation,
                action,
            });
        }
        Ok(items)
    }

    /// 标记完成
    ///
    /// # 返回
    /// - Err(NotFound): id 不存在
    pub fn complete(&self, id: i64, completed_at: NaiveDateTime) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE corrective_actions SET completed = 1, date_completed = ?1 WHERE id = ?2",
            params![completed_at.format(DB_TIMESTAMP_FORMAT).to_string(), id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("corrective_action", id));
        }
        Ok(())
    }
}

fn lookup_fault_code(conn: &Connection, description: &str) -> RepositoryResult<Option<i64>> {
    let code = conn
        .query_row(
            "SELECT code FROM fault_codes WHERE description = ?1 ORDER BY code LIMIT 1",
            params![description],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(code)
}
