// ==========================================
// 针织车间停机统计系统 - 故障事件源错误类型
// ==========================================
// 工具: thiserror 派生宏
// 策略: 批量文件中的坏行跳过; 连接/读取失败整体上抛
// ==========================================

use crate::domain::fault::FaultLineError;
use thiserror::Error;

/// 故障事件源错误类型
#[derive(Error, Debug)]
pub enum SourceError {
    // ===== 连接/读取错误 =====
    #[error("事件源不可用: {0}")]
    Unavailable(String),

    // ===== 数据质量错误 =====
    #[error("记录格式错误 (行 {line}): {message}")]
    MalformedRecord { line: usize, message: String },
}

impl SourceError {
    pub fn malformed(line: usize, err: &FaultLineError) -> Self {
        SourceError::MalformedRecord {
            line,
            message: err.to_string(),
        }
    }
}

// 数据库层面的任何失败都视为事件源不可用
impl From<rusqlite::Error> for SourceError {
    fn from(err: rusqlite::Error) -> Self {
        SourceError::Unavailable(err.to_string())
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Unavailable(err.to_string())
    }
}

/// Result 类型别名
pub type SourceResult<T> = Result<T, SourceError>;
