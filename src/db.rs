// ==========================================
// 针织车间停机统计系统 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 + busy_timeout）
// - ensure_schema 幂等建表,新库与旧库走同一入口
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 库内时间戳格式（字典序即时间序,窗口查询直接比较字符串）
pub const DB_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 库内日期格式
pub const DB_DATE_FORMAT: &str = "%Y-%m-%d";

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER PRIMARY KEY,
        applied_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS config_kv (
        scope_id TEXT NOT NULL,
        key TEXT NOT NULL,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now')),
        PRIMARY KEY (scope_id, key)
    );

    CREATE TABLE IF NOT EXISTS fault_codes (
        code INTEGER PRIMARY KEY,
        description TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS operators (
        code INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS faults (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        machine_number INTEGER NOT NULL,
        fault_code INTEGER NOT NULL,
        operator_code INTEGER NOT NULL,
        fault_time INTEGER NOT NULL,
        visible INTEGER NOT NULL DEFAULT 1
    );
    CREATE INDEX IF NOT EXISTS idx_faults_date_machine ON faults (date, machine_number);

    CREATE TABLE IF NOT EXISTS accountable_knitter (
        date TEXT NOT NULL,
        shift TEXT NOT NULL,
        machine_number INTEGER NOT NULL,
        operator INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_accountable_key
        ON accountable_knitter (date, shift, machine_number);

    CREATE TABLE IF NOT EXISTS corrective_actions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        machine_number INTEGER NOT NULL,
        isdayshift INTEGER NOT NULL,
        fault_code INTEGER NOT NULL,
        observation TEXT NOT NULL,
        action TEXT NOT NULL,
        completed INTEGER NOT NULL DEFAULT 0,
        date_completed TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_corrective_key
        ON corrective_actions (date, machine_number, isdayshift, fault_code);

    CREATE TABLE IF NOT EXISTS linear_thread (
        date TEXT NOT NULL,
        machine_number INTEGER NOT NULL,
        isdayshift INTEGER NOT NULL,
        islinearthread INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_linear_thread_key
        ON linear_thread (date, machine_number, isdayshift);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）并登记 schema_version
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
