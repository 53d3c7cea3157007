// ==========================================
// 针织车间停机统计系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 零分母等边界由显式策略处理,不作为错误
// ==========================================

use crate::source::SourceError;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 输入错误 =====
    #[error("日期格式错误: {0:?}（期望 yyyy-MM-dd）")]
    InvalidDateFormat(String),

    #[error("无效班次: {0:?}（仅支持 day / night）")]
    InvalidShiftLabel(String),

    /// 有效班时 <= 0 时无法计算开机率（调用方在班次开始前请求）
    #[error("班次尚未开始: effective_hours={0}")]
    ShiftNotStarted(f64),

    // ===== 事件源错误 =====
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
