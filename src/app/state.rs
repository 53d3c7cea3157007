// ==========================================
// 针织车间停机统计系统 - 应用状态
// ==========================================
// 职责: 由 FactoryConfig 装配事件源、仓储与 API 实例
// 红线: 连接与配置只在此处创建,向下显式注入
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{FloorApi, ReportApi};
use crate::config::{ConfigManager, FactoryConfig};
use crate::db::{ensure_schema, open_sqlite_connection, read_schema_version};
use crate::engine::ReportAssembler;
use crate::source::{DelimitedFileEventSource, EventSource, SqliteEventSource};

pub use crate::config::get_default_db_path;

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 生效配置（已合并 config_kv 覆写）
    pub config: FactoryConfig,

    /// 报表API
    pub report_api: Arc<ReportApi>,

    /// 车间状态API
    pub floor_api: Arc<FloorApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - config: 车间配置
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表
    /// 2. 合并 config_kv 覆写
    /// 3. 选择事件源并创建所有API实例
    pub fn new(config: FactoryConfig) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", config.db_path);

        let conn = open_sqlite_connection(&config.db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let schema_version = read_schema_version(&conn).map_err(|e| format!("读取schema_version失败: {}", e))?;
        tracing::debug!(?schema_version, "数据库schema就绪");
        let conn = Arc::new(Mutex::new(conn));

        // 配置覆写
        let mut config = config;
        let config_manager =
            ConfigManager::from_connection(conn.clone()).map_err(|e| format!("无法创建ConfigManager: {}", e))?;
        config
            .apply_overrides(&config_manager)
            .map_err(|e| format!("读取配置覆写失败: {}", e))?;

        // 事件源: 配置了日志目录则读文件,否则读故障库
        let source: Arc<dyn EventSource> = match &config.fault_log_dir {
            Some(dir) => {
                tracing::info!("使用日志文件事件源: {}", dir.display());
                Arc::new(DelimitedFileEventSource::new(dir))
            }
            None => Arc::new(SqliteEventSource::new(conn.clone())),
        };

        let report_api = Arc::new(ReportApi::new(ReportAssembler::new(source)));
        let floor_api = Arc::new(FloorApi::new(conn, config.machine_numbers.clone()));

        tracing::info!(machines = ?config.machine_numbers, "AppState初始化完成");
        Ok(Self {
            config,
            report_api,
            floor_api,
        })
    }
}
