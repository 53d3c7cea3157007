// ==========================================
// 针织车间停机统计系统 - 挡车工名册仓储
// ==========================================
// 红线: 查无工号返回 "Unassigned",不视为错误
// ==========================================

use crate::domain::UNASSIGNED;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub struct OperatorRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OperatorRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 工号 → 姓名
    pub fn list(&self) -> RepositoryResult<BTreeMap<i64, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT code, name FROM operators ORDER BY code")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?;

        let mut operators = BTreeMap::new();
        for row in rows {
            let (code, name) = row?;
            operators.insert(code, name);
        }
        Ok(operators)
    }

    pub fn operator_name(&self, code: i64) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        let name = conn
            .query_row("SELECT name FROM operators WHERE code = ?1", params![code], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(name.unwrap_or_else(|| UNASSIGNED.to_string()))
    }

    /// 登记/更名
    pub fn upsert(&self, code: i64, name: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO operators (code, name) VALUES (?1, ?2)
             ON CONFLICT(code) DO UPDATE SET name = excluded.name",
            params![code, name],
        )?;
        Ok(())
    }
}
