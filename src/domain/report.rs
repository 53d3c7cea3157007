// ==========================================
// 针织车间停机统计系统 - 报表结果结构
// ==========================================
// 红线: 字段名为对外契约（驾驶舱前端直接消费）,不得改名
// 四种报表: 总览 / 机台卡片 / 故障日志 / 故障报告
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// 总览报表
// ==========================================
// numbers 与 percentRun 为平行数组,按下标对齐
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewMachines {
    pub numbers: Vec<u32>,
    #[serde(rename = "percentRun")]
    pub percent_run: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewReport {
    pub machines: OverviewMachines,
}

impl OverviewReport {
    /// 查询某机台的开机率
    pub fn percent_for(&self, machine_number: u32) -> Option<f64> {
        self.machines
            .numbers
            .iter()
            .position(|n| *n == machine_number)
            .and_then(|idx| self.machines.percent_run.get(idx).copied())
    }
}

// ==========================================
// 机台卡片
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineCardReport {
    pub machine_number: u32,
    pub down_time: BTreeMap<String, f64>, // 故障描述 → 停机小时
    pub total_down_time: f64,
    pub shift_hours: f64, // 有效班次时长（进行中班次截至当前）
}

// ==========================================
// 故障日志（逐条,不聚合）
// ==========================================
pub const FAULT_LOG_HEADERS: [&str; 4] = ["Date", "Fault", "Fault Time", "Operator"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultLogRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Fault")]
    pub fault: String,
    #[serde(rename = "Fault Time")]
    pub fault_time: String,
    #[serde(rename = "Operator")]
    pub operator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultLogReport {
    pub machine_number: u32,
    pub headers: Vec<String>,
    pub fault_log: Vec<FaultLogRow>,
}

// ==========================================
// 故障报告（按故障描述聚合,次数/时长双占比）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultReportRow {
    #[serde(rename = "Fault")]
    pub fault: String,
    #[serde(rename = "Number of Faults")]
    pub count: u64,
    #[serde(rename = "percentage / count")]
    pub count_share_percent: f64,
    #[serde(rename = "Fault Down Time")]
    pub down_hours: f64,
    #[serde(rename = "percentage / time")]
    pub down_hours_share_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultReport {
    pub machine_number: u32,
    pub total_down_time: f64,
    pub fault_report: Vec<FaultReportRow>,
}

impl FaultReport {
    pub fn row(&self, fault: &str) -> Option<&FaultReportRow> {
        self.fault_report.iter().find(|r| r.fault == fault)
    }
}

// ==========================================
// 报表响应包装
// ==========================================
// 成功时平铺报表字段；失败时只有 error（短且稳定的消息）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse<T> {
    #[serde(flatten)]
    pub report: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ReportResponse<T> {
    pub fn ok(report: T) -> Self {
        Self {
            report: Some(report),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            report: None,
            error: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overview_wire_shape() {
        let report = OverviewReport {
            machines: OverviewMachines {
                numbers: vec![1, 3],
                percent_run: vec![90.0, 100.0],
            },
        };
        let value = serde_json::to_value(ReportResponse::ok(report)).unwrap();
        assert_eq!(
            value,
            json!({ "machines": { "numbers": [1, 3], "percentRun": [90.0, 100.0] } })
        );
    }

    #[test]
    fn test_fault_report_wire_shape() {
        let report = FaultReport {
            machine_number: 3,
            total_down_time: 6.0,
            fault_report: vec![FaultReportRow {
                fault: "Standing".to_string(),
                count: 3,
                count_share_percent: 75.0,
                down_hours: 1.5,
                down_hours_share_percent: 25.0,
            }],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["machineNumber"], json!(3));
        assert_eq!(value["totalDownTime"], json!(6.0));
        let row = &value["faultReport"][0];
        assert_eq!(row["Fault"], json!("Standing"));
        assert_eq!(row["Number of Faults"], json!(3));
        assert_eq!(row["percentage / count"], json!(75.0));
        assert_eq!(row["Fault Down Time"], json!(1.5));
        assert_eq!(row["percentage / time"], json!(25.0));
    }

    #[test]
    fn test_failed_response_only_carries_error() {
        let resp: ReportResponse<MachineCardReport> =
            ReportResponse::failed("Failed to connect to the database");
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value, json!({ "error": "Failed to connect to the database" }));
        assert!(!resp.is_ok());
    }
}
