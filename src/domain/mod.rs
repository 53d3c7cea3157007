// ==========================================
// 针织车间停机统计系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、报表结果结构
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod fault;
pub mod floor;
pub mod report;
pub mod types;
pub mod window;

// 重导出核心类型
pub use fault::{FaultEvent, FaultLineError, FaultLogLine, FEED_TIMESTAMP_FORMAT};
pub use floor::{ActionListItem, CorrectiveAction, CorrectiveActionInput, UNASSIGNED};
pub use report::{
    FaultLogReport, FaultLogRow, FaultReport, FaultReportRow, MachineCardReport,
    OverviewMachines, OverviewReport, ReportResponse, FAULT_LOG_HEADERS,
};
pub use types::{FaultDuration, ShiftLabel, UnknownShiftLabel};
pub use window::ShiftWindow;
