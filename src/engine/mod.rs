// ==========================================
// 针织车间停机统计系统 - 引擎层
// ==========================================
// 职责: 班次时间窗 → 故障聚合 → 百分比/舍入 → 报表组装
// 红线: Engine 不拼 SQL, 数据只经 EventSource 进入
// 红线: 无共享可变状态,并发请求互不影响
// ==========================================

pub mod aggregator;
pub mod error;
pub mod percentage;
pub mod report_assembler;
pub mod shift_window;

// 重导出核心引擎
pub use aggregator::{FaultAggregate, FaultAggregator};
pub use error::{EngineError, EngineResult};
pub use percentage::{round_half_up, PercentageEngine};
pub use report_assembler::ReportAssembler;
pub use shift_window::{parse_date, parse_shift, ShiftWindowResolver, DATE_FORMAT};
