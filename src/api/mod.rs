// ==========================================
// 针织车间停机统计系统 - API 层
// ==========================================
// 职责: 提供报表与车间状态接口,供命令行/前端调用
// ==========================================

pub mod error;
pub mod floor_api;
pub mod report_api;

// 重导出核心类型
pub use error::{messages, ApiError, ApiResult};
pub use floor_api::FloorApi;
pub use report_api::{Clock, DashboardReport, ReportApi};
