// ==========================================
// 针织车间停机统计系统 - 直线纱标记仓储
// ==========================================
// 键: (日期, 机台, 是否白班) → bool; 未设置视为 false
// ==========================================

use crate::db::DB_DATE_FORMAT;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct LinearThreadRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LinearThreadRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn get(&self, date: NaiveDate, machine_number: u32, is_day_shift: bool) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let flag = conn
            .query_row(
                r#"
                SELECT islinearthread FROM linear_thread
                WHERE date = ?1 AND machine_number = ?2 AND isdayshift = ?3
                ORDER BY rowid DESC
                LIMIT 1
                "#,
                params![date.format(DB_DATE_FORMAT).to_string(), machine_number, is_day_shift],
                |row| row.get::<_, bool>(0),
            )
            .optional()?;
        Ok(flag.unwrap_or(false))
    }

    pub fn set(
        &self,
        date: NaiveDate,
        machine_number: u32,
        is_day_shift: bool,
        is_linear_thread: bool,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let date = date.format(DB_DATE_FORMAT).to_string();

        tx.execute(
            "DELETE FROM linear_thread WHERE date = ?1 AND machine_number = ?2 AND isdayshift = ?3",
            params![date, machine_number, is_day_shift],
        )?;
        tx.execute(
            "INSERT INTO linear_thread (date, machine_number, isdayshift, islinearthread) VALUES (?1, ?2, ?3, ?4)",
            params![date, machine_number, is_day_shift, is_linear_thread],
        )?;

        tx.commit()?;
        Ok(())
    }
}
