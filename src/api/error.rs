// ==========================================
// 针织车间停机统计系统 - API层错误类型
// ==========================================
// 职责: 汇总各层错误为统一分类,并给出短且稳定的对外消息
// 分类: 日期格式 / 班次 / 数据源不可用 / 记录格式 / 查无数据
// ==========================================

use crate::domain::FaultLineError;
use crate::engine::EngineError;
use crate::repository::error::RepositoryError;
use crate::source::SourceError;
use thiserror::Error;

/// 对外消息（报表 error 字段直接使用,前端按字面量判断）
pub mod messages {
    pub const DB_CONNECTION: &str = "Failed to connect to the database";
    pub const INVALID_DATE: &str = "Invalid date format";
    pub const INVALID_SHIFT: &str = "Invalid shift";
    pub const MALFORMED_RECORD: &str = "Malformed record";
    pub const NO_DATA: &str = "No data found";
    pub const FAULT_CODE_NOT_FOUND: &str = "Fault code not found";
    pub const INVALID_INPUT: &str = "Invalid input";
    pub const INTERNAL: &str = "Internal error";
}

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求参数错误
    // ==========================================
    #[error("日期格式错误: {0}")]
    InvalidDateFormat(String),

    #[error("无效班次: {0}")]
    InvalidShiftLabel(String),

    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 数据错误
    // ==========================================
    #[error("数据源不可用: {0}")]
    SourceUnavailable(String),

    #[error("记录格式错误: {0}")]
    MalformedRecord(String),

    #[error("资源未找到: {entity}(id={id})")]
    NotFound { entity: String, id: String },

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 对外的短消息
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::InvalidDateFormat(_) => messages::INVALID_DATE,
            ApiError::InvalidShiftLabel(_) => messages::INVALID_SHIFT,
            ApiError::InvalidInput(_) => messages::INVALID_INPUT,
            ApiError::SourceUnavailable(_) => messages::DB_CONNECTION,
            ApiError::MalformedRecord(_) => messages::MALFORMED_RECORD,
            ApiError::NotFound { entity, .. } if entity == "fault_code" => messages::FAULT_CODE_NOT_FOUND,
            ApiError::NotFound { .. } => messages::NO_DATA,
            ApiError::InternalError(_) | ApiError::Other(_) => messages::INTERNAL,
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        ApiError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

// ==========================================
// 从下层错误转换
// ==========================================
impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Unavailable(msg) => ApiError::SourceUnavailable(msg),
            e @ SourceError::MalformedRecord { .. } => ApiError::MalformedRecord(e.to_string()),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidDateFormat(raw) => ApiError::InvalidDateFormat(raw),
            EngineError::InvalidShiftLabel(raw) => ApiError::InvalidShiftLabel(raw),
            e @ EngineError::ShiftNotStarted(_) => ApiError::InvalidInput(e.to_string()),
            EngineError::Source(e) => e.into(),
        }
    }
}

impl From<FaultLineError> for ApiError {
    fn from(err: FaultLineError) -> Self {
        ApiError::MalformedRecord(err.to_string())
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ApiError::NotFound { entity, id },

            // 连接/锁/事务/查询失败统一视为数据源不可用
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::SourceUnavailable(msg),
            RepositoryError::LockError(msg) => {
                ApiError::SourceUnavailable(format!("数据库锁获取失败: {}", msg))
            }

            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("外键约束违反: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::MalformedRecord(format!("字段{}错误: {}", field, message))
            }

            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
