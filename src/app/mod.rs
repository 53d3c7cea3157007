// ==========================================
// 针织车间停机统计系统 - 应用层
// ==========================================
// 职责: 装配配置、数据源与 API,供命令行入口使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
