// ==========================================
// 针织车间停机统计系统 - 车间配置对象
// ==========================================
// 职责: 显式配置,构造时注入事件源与各仓储（无全局连接/全局配置）
// 来源: 默认值 → 环境变量 → config_kv 覆写
// ==========================================

use crate::config::config_manager::ConfigManager;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::PathBuf;
use tracing::debug;

/// 车间机台清单（默认）
pub const DEFAULT_MACHINE_NUMBERS: [u32; 8] = [1, 2, 3, 17, 19, 26, 27, 28];

pub const ENV_DB_PATH: &str = "KNIT_DOWNTIME_DB_PATH";
pub const ENV_FAULT_LOG_DIR: &str = "KNIT_DOWNTIME_FAULT_LOG_DIR";
pub const ENV_MACHINES: &str = "KNIT_DOWNTIME_MACHINES";

// ==========================================
// FactoryConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryConfig {
    pub db_path: String,
    /// 设置后报表读取按日日志文件,否则读取 faults 表
    pub fault_log_dir: Option<PathBuf>,
    pub machine_numbers: Vec<u32>,
}

impl FactoryConfig {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            fault_log_dir: None,
            machine_numbers: DEFAULT_MACHINE_NUMBERS.to_vec(),
        }
    }

    pub fn with_fault_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fault_log_dir = Some(dir.into());
        self
    }

    pub fn with_machine_numbers(mut self, machines: Vec<u32>) -> Self {
        self.machine_numbers = machines;
        self
    }

    /// 从环境变量构造
    ///
    /// # 环境变量
    /// - KNIT_DOWNTIME_DB_PATH: 数据库路径（缺省为用户数据目录）
    /// - KNIT_DOWNTIME_FAULT_LOG_DIR: 日志文件目录（缺省不使用文件源）
    /// - KNIT_DOWNTIME_MACHINES: 逗号分隔的机台号
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        let mut config = Self::new(get_default_db_path());

        if let Some(dir) = non_empty_env(ENV_FAULT_LOG_DIR) {
            config.fault_log_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = non_empty_env(ENV_MACHINES) {
            config.machine_numbers = parse_machine_list(&raw)
                .map_err(|e| format!("{} 格式错误: {}", ENV_MACHINES, e))?;
        }

        debug!(?config, "已加载环境配置");
        Ok(config)
    }

    /// 应用 config_kv 中的全局覆写
    ///
    /// 覆写值格式错误时保留原值（ConfigManager 负责告警）
    pub fn apply_overrides(&mut self, manager: &ConfigManager) -> Result<(), Box<dyn Error>> {
        if let Some(machines) = manager.get_machine_numbers()? {
            self.machine_numbers = machines;
        }
        if let Some(dir) = manager.get_fault_log_dir()? {
            self.fault_log_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }
}

/// 默认数据库路径
///
/// 优先 KNIT_DOWNTIME_DB_PATH, 其次用户数据目录, 最后当前目录
pub fn get_default_db_path() -> String {
    if let Some(path) = non_empty_env(ENV_DB_PATH) {
        return path;
    }

    let mut path = PathBuf::from("./knit_downtime.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("knit-downtime");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("knit_downtime.db");
        }
    }
    path.to_string_lossy().to_string()
}

/// 解析 "1, 2,17" 形式的机台清单
pub fn parse_machine_list(raw: &str) -> Result<Vec<u32>, String> {
    let mut machines = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let n = part
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("无效机台号: {:?}", part))?;
        if !machines.contains(&n) {
            machines.push(n);
        }
    }
    if machines.is_empty() {
        return Err("机台清单为空".to_string());
    }
    Ok(machines)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
