// ==========================================
// 针织车间停机统计系统 - 配置管理器
// ==========================================
// 职责: 读取/写入 config_kv 中的全局覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 全局作用域
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    // ===== 车间配置 =====

    /// 机台清单覆写（JSON 数组,如 [1,2,3]）
    ///
    /// 格式错误或为空时告警并返回 None
    pub fn get_machine_numbers(&self) -> Result<Option<Vec<u32>>, Box<dyn Error>> {
        let raw = match self.get_global_config_value(config_keys::MACHINE_NUMBERS)? {
            Some(v) => v,
            None => return Ok(None),
        };

        match serde_json::from_str::<Vec<u32>>(&raw) {
            Ok(machines) if !machines.is_empty() && machines.iter().all(|m| *m > 0) => Ok(Some(machines)),
            _ => {
                tracing::warn!(
                    config_key = config_keys::MACHINE_NUMBERS,
                    raw_value = %raw,
                    "机台清单配置格式错误，使用原配置"
                );
                Ok(None)
            }
        }
    }

    /// 日志文件目录覆写
    pub fn get_fault_log_dir(&self) -> Result<Option<String>, Box<dyn Error>> {
        Ok(self
            .get_global_config_value(config_keys::FAULT_LOG_DIR)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const MACHINE_NUMBERS: &str = "machine_numbers"; // JSON 数组
    pub const FAULT_LOG_DIR: &str = "fault_log_dir";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactoryConfig;
    use std::path::PathBuf;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_missing_keys_leave_config_untouched() {
        let manager = manager();
        let mut config = FactoryConfig::new("x.db");
        config.apply_overrides(&manager).unwrap();
        assert_eq!(config, FactoryConfig::new("x.db"));
    }

    #[test]
    fn test_overrides_applied() {
        let manager = manager();
        manager
            .set_global_config_value(config_keys::MACHINE_NUMBERS, "[3, 17]")
            .unwrap();
        manager
            .set_global_config_value(config_keys::FAULT_LOG_DIR, "/srv/fault-logs")
            .unwrap();

        let mut config = FactoryConfig::new("x.db");
        config.apply_overrides(&manager).unwrap();
        assert_eq!(config.machine_numbers, vec![3, 17]);
        assert_eq!(config.fault_log_dir, Some(PathBuf::from("/srv/fault-logs")));
    }

    #[test]
    fn test_malformed_machine_list_ignored() {
        let manager = manager();
        manager
            .set_global_config_value(config_keys::MACHINE_NUMBERS, "3,17")
            .unwrap();
        assert_eq!(manager.get_machine_numbers().unwrap(), None);

        manager
            .set_global_config_value(config_keys::MACHINE_NUMBERS, "[]")
            .unwrap();
        assert_eq!(manager.get_machine_numbers().unwrap(), None);
    }
}
