// ==========================================
// 针织车间停机统计系统 - 车间可变状态实体
// ==========================================
// 包含: 当班责任挡车工 / 纠正措施 / 直线纱标记
// 与停机聚合无关,但与故障数据同库存储
// ==========================================

use serde::{Deserialize, Serialize};

/// 未分配责任人时的占位名称
pub const UNASSIGNED: &str = "Unassigned";

// ==========================================
// CorrectiveActionInput - 单条纠正措施提交
// ==========================================
// 前端示例: { "fault": "Standing", "observation": "...", "action": "..." }
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectiveActionInput {
    pub fault: String,
    pub observation: String,
    pub action: String,
}

// ==========================================
// CorrectiveAction - 未完成的纠正措施
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectiveAction {
    pub id: i64,
    pub observation: String,
    pub action: String,
}

// ==========================================
// ActionListItem - 待办措施列表行
// ==========================================
// 字段名对齐数据库列名（前端按列名读取）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionListItem {
    pub id: i64,
    pub date: String, // dd/MM/yyyy
    pub machine_number: u32,
    pub isdayshift: bool,
    pub fault_code: i64,
    pub observation: String,
    pub action: String,
}
