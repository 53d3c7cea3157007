// ==========================================
// 针织车间停机统计系统 - 故障事件源
// ==========================================
// 职责: 按班次时间窗提供已过滤的故障事件序列
// 实现: SQLite 故障库 / 按日落盘的分隔符日志 / 内存（测试与演示）
// 红线: 时间窗过滤由事件源负责,聚合器不再二次过滤
// ==========================================

pub mod error;
pub mod file_source;
pub mod memory_source;
pub mod sqlite_source;

pub use error::{SourceError, SourceResult};
pub use file_source::DelimitedFileEventSource;
pub use memory_source::InMemoryEventSource;
pub use sqlite_source::SqliteEventSource;

use crate::domain::{FaultEvent, ShiftWindow};

// ==========================================
// EventSource Trait
// ==========================================
// 用途: 报表组装器的唯一数据入口（策略模式注入）
// 实现者: SqliteEventSource / DelimitedFileEventSource / InMemoryEventSource
pub trait EventSource: Send + Sync {
    /// 事件源名称（日志用）
    fn name(&self) -> &'static str;

    /// 拉取时间窗内的故障事件
    ///
    /// # 参数
    /// - window: 已解析的班次时间窗,事件时间须落在 [start, end)
    /// - machine: 机台过滤（None 表示全部机台）
    ///
    /// # 返回
    /// - Ok(Vec<FaultEvent>): 无匹配时为空序列,不是错误
    /// - Err(SourceError::Unavailable): 存储/文件不可达
    fn fetch(&self, window: &ShiftWindow, machine: Option<u32>) -> SourceResult<Vec<FaultEvent>>;
}
