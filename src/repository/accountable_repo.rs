// ==========================================
// 针织车间停机统计系统 - 当班责任挡车工仓储
// ==========================================
// 键: (日期, 班次, 机台) → 挡车工工号
// 红线: set 为覆盖语义,同一事务内先删后插,重复调用不产生重复行
// ==========================================

use crate::db::DB_DATE_FORMAT;
use crate::domain::{ShiftLabel, UNASSIGNED};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub struct AccountableKnitterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AccountableKnitterRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询各机台责任人姓名
    ///
    /// # 返回
    /// 请求的每个机台都有一项; 未分配的为 "Unassigned"
    pub fn get(
        &self,
        date: NaiveDate,
        shift: ShiftLabel,
        machines: &[u32],
    ) -> RepositoryResult<BTreeMap<u32, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT COALESCE(o.name, CAST(ak.operator AS TEXT))
            FROM accountable_knitter ak
            LEFT JOIN operators o ON o.code = ak.operator
            WHERE ak.date = ?1 AND ak.shift = ?2 AND ak.machine_number = ?3
            ORDER BY ak.rowid DESC
            LIMIT 1
            "#,
        )?;

        let date = date.format(DB_DATE_FORMAT).to_string();
        let mut assigned = BTreeMap::new();
        for &machine in machines {
            let name = stmt
                .query_row(params![date, shift.as_str(), machine], |row| row.get::<_, String>(0))
                .optional()?;
            assigned.insert(machine, name.unwrap_or_else(|| UNASSIGNED.to_string()));
        }
        Ok(assigned)
    }

    /// 设置责任人（覆盖）
    ///
    /// # 返回
    /// - Ok(usize): 写入的机台数
    pub fn set(
        &self,
        operator_code: i64,
        date: NaiveDate,
        shift: ShiftLabel,
        machines: &[u32],
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let date = date.format(DB_DATE_FORMAT).to_string();

        let mut written = 0;
        for &machine in machines {
            tx.execute(
                "DELETE FROM accountable_knitter WHERE date = ?1 AND shift = ?2 AND machine_number = ?3",
                params![date, shift.as_str(), machine],
            )?;
            written += tx.execute(
                "INSERT INTO accountable_knitter (date, shift, machine_number, operator) VALUES (?1, ?2, ?3, ?4)",
                params![date, shift.as_str(), machine, operator_code],
            )?;
        }

        tx.commit()?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> (AccountableKnitterRepository, Arc<Mutex<Connection>>) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        conn.execute_batch("INSERT INTO operators (code, name) VALUES (10, 'Alice'), (11, 'Bob');")
            .unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (AccountableKnitterRepository::from_connection(conn.clone()), conn)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()
    }

    #[test]
    fn test_unassigned_machines_reported() {
        let (repo, _) = setup_repo();
        repo.set(10, date(), ShiftLabel::Day, &[1, 2]).unwrap();

        let got = repo.get(date(), ShiftLabel::Day, &[1, 2, 3]).unwrap();
        assert_eq!(got[&1], "Alice");
        assert_eq!(got[&2], "Alice");
        assert_eq!(got[&3], UNASSIGNED);

        // 其他班次不受影响
        let night = repo.get(date(), ShiftLabel::Night, &[1]).unwrap();
        assert_eq!(night[&1], UNASSIGNED);
    }

    #[test]
    fn test_set_twice_keeps_single_row() {
        let (repo, conn) = setup_repo();
        repo.set(10, date(), ShiftLabel::Night, &[3, 17]).unwrap();
        repo.set(10, date(), ShiftLabel::Night, &[3, 17]).unwrap();

        let rows: i64 = conn
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM accountable_knitter", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_set_overwrites_previous_operator() {
        let (repo, _) = setup_repo();
        repo.set(10, date(), ShiftLabel::Day, &[3]).unwrap();
        repo.set(11, date(), ShiftLabel::Day, &[3]).unwrap();
        assert_eq!(repo.get(date(), ShiftLabel::Day, &[3]).unwrap()[&3], "Bob");

        // 未登记工号显示工号本身
        repo.set(42, date(), ShiftLabel::Day, &[3]).unwrap();
        assert_eq!(repo.get(date(), ShiftLabel::Day, &[3]).unwrap()[&3], "42");
    }
}
