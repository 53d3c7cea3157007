// ==========================================
// 针织车间停机统计系统 - 报表 API
// ==========================================
// 职责: 四种报表的对外入口; 失败时填充 error 字段,不抛出
// 架构: API 层 → ReportAssembler → EventSource
// 红线: 不返回"部分成功"的报表; 失败一律以 error 表达
// ==========================================

use crate::api::error::{messages, ApiError};
use crate::domain::{FaultLogReport, FaultReport, MachineCardReport, OverviewReport, ReportResponse};
use crate::engine::{EngineResult, ReportAssembler};
use chrono::{Local, NaiveDateTime};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{error, info};

/// 当前时刻提供者（测试中注入固定时间）
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

// ==========================================
// DashboardReport - 驾驶舱一次性拉取结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub overview: ReportResponse<OverviewReport>,
    pub machine_cards: Vec<ReportResponse<MachineCardReport>>,
}

// ==========================================
// ReportApi
// ==========================================
pub struct ReportApi {
    assembler: ReportAssembler,
    clock: Clock,
}

impl ReportApi {
    /// 创建报表 API（使用本地时钟）
    pub fn new(assembler: ReportAssembler) -> Self {
        Self {
            assembler,
            clock: Arc::new(|| Local::now().naive_local()),
        }
    }

    /// 替换时钟
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    // ==========================================
    // 报表查询
    // ==========================================

    pub fn overview(&self, date: &str, shift: &str) -> ReportResponse<OverviewReport> {
        self.overview_at(date, shift, self.now())
    }

    pub fn machine_card(&self, machine_number: u32, date: &str, shift: &str) -> ReportResponse<MachineCardReport> {
        self.machine_card_at(machine_number, date, shift, self.now())
    }

    pub fn fault_log(&self, machine_number: u32, date: &str, shift: &str) -> ReportResponse<FaultLogReport> {
        respond(
            "fault_log",
            self.assembler.fault_log(machine_number, date, shift, self.now()),
        )
    }

    pub fn fault_report(&self, machine_number: u32, date: &str, shift: &str) -> ReportResponse<FaultReport> {
        respond(
            "fault_report",
            self.assembler.fault_report(machine_number, date, shift, self.now()),
        )
    }

    /// 指定时刻的总览（同一批请求共用一个 now）
    pub fn overview_at(&self, date: &str, shift: &str, now: NaiveDateTime) -> ReportResponse<OverviewReport> {
        respond("overview", self.assembler.overview(date, shift, now))
    }

    pub fn machine_card_at(
        &self,
        machine_number: u32,
        date: &str,
        shift: &str,
        now: NaiveDateTime,
    ) -> ReportResponse<MachineCardReport> {
        respond(
            "machine_card",
            self.assembler.machine_card(machine_number, date, shift, now),
        )
    }

    /// 驾驶舱: 总览 + 各机台卡片并发拉取
    ///
    /// 每个报表在 tokio 阻塞线程池上独立组装,互不共享可变状态
    pub async fn dashboard(api: Arc<Self>, date: &str, shift: &str, machines: &[u32]) -> DashboardReport {
        let now = api.now();
        info!(date, shift, machines = machines.len(), source = api.assembler.source_name(), "驾驶舱并发拉取");

        let overview_task = {
            let api = Arc::clone(&api);
            let (date, shift) = (date.to_string(), shift.to_string());
            tokio::task::spawn_blocking(move || api.overview_at(&date, &shift, now))
        };

        let card_tasks = machines.iter().map(|&machine| {
            let api = Arc::clone(&api);
            let (date, shift) = (date.to_string(), shift.to_string());
            tokio::task::spawn_blocking(move || api.machine_card_at(machine, &date, &shift, now))
        });

        let overview = joined(overview_task.await);
        let machine_cards = join_all(card_tasks).await.into_iter().map(joined).collect();

        DashboardReport {
            overview,
            machine_cards,
        }
    }
}

/// 引擎结果 → 报表响应
fn respond<T>(report: &'static str, result: EngineResult<T>) -> ReportResponse<T> {
    match result {
        Ok(value) => ReportResponse::ok(value),
        Err(err) => {
            let err = ApiError::from(err);
            error!(report, error = %err, "报表生成失败");
            ReportResponse::failed(err.user_message())
        }
    }
}

fn joined<T>(result: Result<ReportResponse<T>, JoinError>) -> ReportResponse<T> {
    result.unwrap_or_else(|e| {
        error!(error = %e, "报表任务异常退出");
        ReportResponse::failed(messages::INTERNAL)
    })
}
