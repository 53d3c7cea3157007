// ==========================================
// 针织车间停机统计系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 车间可变状态与故障写入,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 约束: 覆盖类写入在单事务内先删后插
// ==========================================

pub mod accountable_repo;
pub mod corrective_action_repo;
pub mod error;
pub mod fault_repo;
pub mod linear_thread_repo;
pub mod operator_repo;

// 重导出核心仓储
pub use accountable_repo::AccountableKnitterRepository;
pub use corrective_action_repo::{CorrectiveActionRepository, ACTION_LIST_DATE_FORMAT};
pub use error::{RepositoryError, RepositoryResult};
pub use fault_repo::FaultRepository;
pub use linear_thread_repo::LinearThreadRepository;
pub use operator_repo::OperatorRepository;
