// ==========================================
// 针织车间停机统计系统 - 配置层
// ==========================================
// 职责: 车间配置对象 + config_kv 全局覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod factory_config;

pub use config_manager::{config_keys, ConfigManager};
pub use factory_config::{get_default_db_path, parse_machine_list, FactoryConfig, DEFAULT_MACHINE_NUMBERS};
