// ==========================================
// 针织车间停机统计系统 - 车间状态 API
// ==========================================
// 职责: 机台清单 / 挡车工名册 / 责任挡车工 / 纠正措施 / 直线纱 / 故障录入与撤销
// 红线: 单条录入遇到格式错误立即失败（调用方需要逐条结果）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::db::DB_TIMESTAMP_FORMAT;
use crate::domain::{ActionListItem, CorrectiveAction, CorrectiveActionInput, FaultLogLine};
use crate::engine::{parse_date, parse_shift};
use crate::repository::{
    AccountableKnitterRepository, CorrectiveActionRepository, FaultRepository, LinearThreadRepository,
    OperatorRepository,
};
use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

// ==========================================
// FloorApi
// ==========================================
pub struct FloorApi {
    machine_numbers: Vec<u32>,
    fault_repo: FaultRepository,
    operator_repo: OperatorRepository,
    accountable_repo: AccountableKnitterRepository,
    action_repo: CorrectiveActionRepository,
    linear_thread_repo: LinearThreadRepository,
}

impl FloorApi {
    /// 创建车间状态 API
    ///
    /// # 参数
    /// - conn: 共享连接（各仓储共用）
    /// - machine_numbers: 车间机台清单
    pub fn new(conn: Arc<Mutex<Connection>>, machine_numbers: Vec<u32>) -> Self {
        Self {
            machine_numbers,
            fault_repo: FaultRepository::from_connection(conn.clone()),
            operator_repo: OperatorRepository::from_connection(conn.clone()),
            accountable_repo: AccountableKnitterRepository::from_connection(conn.clone()),
            action_repo: CorrectiveActionRepository::from_connection(conn.clone()),
            linear_thread_repo: LinearThreadRepository::from_connection(conn),
        }
    }

    // ==========================================
    // 名册
    // ==========================================

    pub fn machine_numbers(&self) -> Vec<u32> {
        self.machine_numbers.clone()
    }

    pub fn operators(&self) -> ApiResult<BTreeMap<i64, String>> {
        Ok(self.operator_repo.list()?)
    }

    pub fn operator_name(&self, code: i64) -> ApiResult<String> {
        Ok(self.operator_repo.operator_name(code)?)
    }

    /// 故障码 → 描述（随机台推送自动登记）
    pub fn fault_codes(&self) -> ApiResult<BTreeMap<i64, String>> {
        Ok(self.fault_repo.fault_codes()?)
    }

    // ==========================================
    // 故障录入/撤销
    // ==========================================

    /// 录入机台推送的一行故障日志
    ///
    /// # 返回
    /// - Ok(i64): 新故障记录 id
    /// - Err(MalformedRecord): 行格式错误,不写入
    #[instrument(skip(self))]
    pub fn input_fault_log(&self, line: &str) -> ApiResult<i64> {
        let parsed = FaultLogLine::parse(line).map_err(|e| {
            warn!(error = %e, "故障日志行格式错误,拒绝录入");
            ApiError::from(e)
        })?;
        let id = self.fault_repo.insert_log_line(&parsed)?;
        info!(id, machine = parsed.machine_number, "故障已录入");
        Ok(id)
    }

    /// 整经故障推送（暂不入库）
    pub fn input_warping_fault_log(&self, line: &str) {
        info!(line, "收到整经故障日志,暂不处理");
    }

    /// 针织产量推送（暂不入库）
    pub fn input_knitting_production_log(&self, line: &str) {
        info!(line, "收到针织产量日志,暂不处理");
    }

    /// 撤销故障（时间戳精确匹配,格式 yyyy-MM-dd HH:mm:ss）
    ///
    /// # 返回
    /// - Ok(usize): 被隐藏的记录数
    pub fn remove_fault(&self, timestamp: &str, machine_number: u32) -> ApiResult<usize> {
        let occurred_at = NaiveDateTime::parse_from_str(timestamp.trim(), DB_TIMESTAMP_FORMAT)
            .map_err(|_| ApiError::InvalidDateFormat(timestamp.to_string()))?;
        let hidden = self.fault_repo.remove_fault(occurred_at, machine_number)?;
        info!(%occurred_at, machine_number, hidden, "故障已撤销");
        Ok(hidden)
    }

    // ==========================================
    // 责任挡车工
    // ==========================================

    pub fn check_accountable_knitter(
        &self,
        date: &str,
        shift: &str,
        machines: &[u32],
    ) -> ApiResult<BTreeMap<u32, String>> {
        let date = parse_date(date)?;
        let shift = parse_shift(shift)?;
        Ok(self.accountable_repo.get(date, shift, machines)?)
    }

    pub fn set_accountable_knitter(
        &self,
        operator_code: i64,
        date: &str,
        shift: &str,
        machines: &[u32],
    ) -> ApiResult<usize> {
        let date = parse_date(date)?;
        let shift = parse_shift(shift)?;
        if machines.is_empty() {
            return Err(ApiError::InvalidInput("机台列表为空".to_string()));
        }
        let written = self.accountable_repo.set(operator_code, date, shift, machines)?;
        info!(operator_code, %date, %shift, written, "责任挡车工已设置");
        Ok(written)
    }

    // ==========================================
    // 纠正措施
    // ==========================================

    pub fn save_corrective_actions(
        &self,
        date: &str,
        machine_number: u32,
        is_day_shift: bool,
        actions: &[CorrectiveActionInput],
    ) -> ApiResult<usize> {
        let date = parse_date(date)?;
        let written = self
            .action_repo
            .save(date, machine_number, is_day_shift, actions)?;
        info!(%date, machine_number, is_day_shift, written, "纠正措施已保存");
        Ok(written)
    }

    /// # 返回
    /// - Err(NotFound): 故障描述未知,或没有未完成的措施
    pub fn get_corrective_action(
        &self,
        date: &str,
        machine_number: u32,
        is_day_shift: bool,
        fault: &str,
    ) -> ApiResult<CorrectiveAction> {
        let date = parse_date(date)?;
        self.action_repo
            .get_open(date, machine_number, is_day_shift, fault)?
            .ok_or_else(|| ApiError::not_found("corrective_action", format!("{}/{}/{}", date, machine_number, fault)))
    }

    pub fn action_list(&self) -> ApiResult<Vec<ActionListItem>> {
        Ok(self.action_repo.list_open()?)
    }

    /// 标记措施完成（完成时间格式 yyyy-MM-dd HH:mm:ss）
    pub fn complete_action(&self, id: i64, completed_at: &str) -> ApiResult<()> {
        let completed_at = NaiveDateTime::parse_from_str(completed_at.trim(), DB_TIMESTAMP_FORMAT)
            .map_err(|_| ApiError::InvalidDateFormat(completed_at.to_string()))?;
        self.action_repo.complete(id, completed_at)?;
        info!(id, %completed_at, "纠正措施已完成");
        Ok(())
    }

    // ==========================================
    // 直线纱
    // ==========================================

    pub fn get_linear_thread(&self, date: &str, machine_number: u32, is_day_shift: bool) -> ApiResult<bool> {
        let date = parse_date(date)?;
        Ok(self.linear_thread_repo.get(date, machine_number, is_day_shift)?)
    }

    pub fn set_linear_thread(
        &self,
        date: &str,
        machine_number: u32,
        is_day_shift: bool,
        is_linear_thread: bool,
    ) -> ApiResult<()> {
        let date = parse_date(date)?;
        self.linear_thread_repo
            .set(date, machine_number, is_day_shift, is_linear_thread)?;
        Ok(())
    }
}
