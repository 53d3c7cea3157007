// ==========================================
// 针织车间停机统计系统 - 故障事件领域模型
// ==========================================
// 来源: 机台故障日志（数据库 faults 表 / 分隔符日志文件）
// 红线: 事件创建后不可变,聚合核心只读不写
// ==========================================

use crate::domain::types::FaultDuration;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 机台日志时间格式（dd/MM/yyyy HH:mm:ss）
pub const FEED_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

// ==========================================
// FaultEvent - 单次故障停机
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultEvent {
    pub machine_number: u32,               // 机台号
    pub fault_label: String,               // 故障描述（同一故障码稳定）
    pub operator: String,                  // 当班挡车工（姓名或工号）
    pub occurred_at: Option<NaiveDateTime>, // 发生时间（文件来源可能缺失）
    pub duration: FaultDuration,           // 停机时长
}

// ==========================================
// FaultLogLine - 机台推送的一行故障日志
// ==========================================
// 格式: dd/MM/yyyy HH:mm:ss;故障码;故障描述;工号;姓名;停机时长;机台号
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultLogLine {
    pub occurred_at: NaiveDateTime,
    pub fault_code: i64,
    pub fault_description: String,
    pub operator_code: i64,
    pub operator_name: String,
    pub duration: FaultDuration,
    pub machine_number: u32,
}

/// 故障日志行解析错误（指明出错字段）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("字段 {field} 无法解析: {value:?}")]
pub struct FaultLineError {
    pub field: &'static str,
    pub value: String,
}

impl FaultLineError {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

impl FaultLogLine {
    /// 解析一行 `;` 分隔的故障日志
    pub fn parse(line: &str) -> Result<Self, FaultLineError> {
        let columns: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(';').collect();
        Self::from_columns(&columns)
    }

    /// 从已拆分的列构造（CSV 读取器复用）
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Result<Self, FaultLineError> {
        let raw_ts = column(columns, 0, "date")?;
        let occurred_at = NaiveDateTime::parse_from_str(raw_ts, FEED_TIMESTAMP_FORMAT)
            .map_err(|_| FaultLineError::new("date", raw_ts))?;
        let body = LineBody::parse(columns)?;

        Ok(Self {
            occurred_at,
            fault_code: body.fault_code,
            fault_description: body.fault_description,
            operator_code: body.operator_code,
            operator_name: body.operator_name,
            duration: body.duration,
            machine_number: body.machine_number,
        })
    }

    /// 日期列为空的文件行: 只有停机时长,没有发生时间
    ///
    /// 日期列非空但无法解析时仍按格式错误处理
    pub fn undated_event<S: AsRef<str>>(columns: &[S]) -> Result<FaultEvent, FaultLineError> {
        let raw_ts = columns.first().map(|c| c.as_ref().trim()).unwrap_or("");
        if !raw_ts.is_empty() {
            return Err(FaultLineError::new("date", raw_ts));
        }
        let body = LineBody::parse(columns)?;
        Ok(FaultEvent {
            machine_number: body.machine_number,
            fault_label: body.fault_description,
            operator: body.operator_name,
            occurred_at: None,
            duration: body.duration,
        })
    }

    /// 转换为聚合用的故障事件
    pub fn into_event(self) -> FaultEvent {
        FaultEvent {
            machine_number: self.machine_number,
            fault_label: self.fault_description,
            operator: self.operator_name,
            occurred_at: Some(self.occurred_at),
            duration: self.duration,
        }
    }
}

fn column<'a, S: AsRef<str>>(
    columns: &'a [S],
    idx: usize,
    field: &'static str,
) -> Result<&'a str, FaultLineError> {
    columns
        .get(idx)
        .map(|c| c.as_ref().trim())
        .ok_or_else(|| FaultLineError::new(field, ""))
}

// 第 2~7 列（除时间戳外的全部字段）
struct LineBody {
    fault_code: i64,
    fault_description: String,
    operator_code: i64,
    operator_name: String,
    duration: FaultDuration,
    machine_number: u32,
}

impl LineBody {
    fn parse<S: AsRef<str>>(columns: &[S]) -> Result<Self, FaultLineError> {
        let raw_code = column(columns, 1, "fault_code")?;
        let fault_code = raw_code
            .parse::<i64>()
            .map_err(|_| FaultLineError::new("fault_code", raw_code))?;

        let fault_description = column(columns, 2, "fault_description")?.to_string();

        let raw_op = column(columns, 3, "operator_code")?;
        let operator_code = raw_op
            .parse::<i64>()
            .map_err(|_| FaultLineError::new("operator_code", raw_op))?;

        let operator_name = column(columns, 4, "operator_name")?.to_string();

        let raw_time = column(columns, 5, "fault_time")?;
        let duration = FaultDuration::parse_hms(raw_time)
            .ok_or_else(|| FaultLineError::new("fault_time", raw_time))?;

        let raw_machine = column(columns, 6, "machine_number")?;
        let machine_number = raw_machine
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| FaultLineError::new("machine_number", raw_machine))?;

        Ok(Self {
            fault_code,
            fault_description,
            operator_code,
            operator_name,
            duration,
            machine_number,
        })
    }
}
