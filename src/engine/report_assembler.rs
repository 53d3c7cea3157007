// ==========================================
// 针织车间停机统计系统 - 报表组装器
// ==========================================
// 流程: 解析时间窗 → 事件源拉取 → 聚合 → 百分比/舍入 → 报表结构
// 报表: 总览 / 机台卡片 / 故障日志 / 故障报告
// 红线: 聚合值不舍入,只在输出百分比与报告时长时舍入一次
// 红线: 无共享可变状态,同输入同输出
// ==========================================

use crate::domain::{
    FaultEvent, FaultLogReport, FaultLogRow, FaultReport, FaultReportRow, MachineCardReport,
    OverviewMachines, OverviewReport, ShiftWindow, FAULT_LOG_HEADERS,
};
use crate::engine::aggregator::{total_count, total_duration, FaultAggregator};
use crate::engine::error::EngineResult;
use crate::engine::percentage::{round_half_up, PercentageEngine, PERCENT_DECIMALS};
use crate::engine::shift_window::ShiftWindowResolver;
use crate::source::EventSource;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// 故障日志中时间戳的输出格式
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ReportAssembler
// ==========================================
#[derive(Clone)]
pub struct ReportAssembler {
    source: Arc<dyn EventSource>,
    resolver: ShiftWindowResolver,
    aggregator: FaultAggregator,
    percentage: PercentageEngine,
}

impl ReportAssembler {
    /// 创建报表组装器
    ///
    /// # 参数
    /// - source: 故障事件源（SQLite / 日志文件 / 内存）
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self {
            source,
            resolver: ShiftWindowResolver::new(),
            aggregator: FaultAggregator::new(),
            percentage: PercentageEngine::new(),
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    // ==========================================
    // 入口: 字符串参数 → 报表
    // ==========================================

    /// 总览: 有故障记录的各机台开机率
    #[instrument(skip(self, now), fields(source = self.source.name()))]
    pub fn overview(&self, date: &str, shift: &str, now: NaiveDateTime) -> EngineResult<OverviewReport> {
        let window = self.resolver.resolve(date, shift, now)?;
        let events = self.source.fetch(&window, None)?;
        self.build_overview(&window, &events)
    }

    /// 机台卡片: 单机台按故障描述的停机小时
    #[instrument(skip(self, now), fields(source = self.source.name()))]
    pub fn machine_card(
        &self,
        machine_number: u32,
        date: &str,
        shift: &str,
        now: NaiveDateTime,
    ) -> EngineResult<MachineCardReport> {
        let window = self.resolver.resolve(date, shift, now)?;
        let events = self.source.fetch(&window, Some(machine_number))?;
        Ok(self.build_machine_card(machine_number, &window, &events))
    }

    /// 故障日志: 单机台逐条故障
    #[instrument(skip(self, now), fields(source = self.source.name()))]
    pub fn fault_log(
        &self,
        machine_number: u32,
        date: &str,
        shift: &str,
        now: NaiveDateTime,
    ) -> EngineResult<FaultLogReport> {
        let window = self.resolver.resolve(date, shift, now)?;
        let events = self.source.fetch(&window, Some(machine_number))?;
        Ok(self.build_fault_log(machine_number, &events))
    }

    /// 故障报告: 单机台按故障描述的次数/时长占比
    #[instrument(skip(self, now), fields(source = self.source.name()))]
    pub fn fault_report(
        &self,
        machine_number: u32,
        date: &str,
        shift: &str,
        now: NaiveDateTime,
    ) -> EngineResult<FaultReport> {
        let window = self.resolver.resolve(date, shift, now)?;
        let events = self.source.fetch(&window, Some(machine_number))?;
        Ok(self.build_fault_report(machine_number, &events))
    }

    // ==========================================
    // 纯组装: 时间窗 + 事件 → 报表
    // ==========================================

    /// 零故障机台不会出现在聚合结果中,因此也不出现在总览里
    pub fn build_overview(&self, window: &ShiftWindow, events: &[FaultEvent]) -> EngineResult<OverviewReport> {
        let buckets = self.aggregator.by_machine(events);

        let mut machines = OverviewMachines::default();
        for (machine_number, bucket) in &buckets {
            let pct = self
                .percentage
                .uptime_percent(window.effective_hours, bucket.total_duration)?;
            machines.numbers.push(*machine_number);
            machines.percent_run.push(pct);
        }

        debug!(
            machines = machines.numbers.len(),
            in_progress = window.in_progress(),
            "总览组装完成"
        );
        Ok(OverviewReport { machines })
    }

    pub fn build_machine_card(
        &self,
        machine_number: u32,
        window: &ShiftWindow,
        events: &[FaultEvent],
    ) -> MachineCardReport {
        let buckets = self.aggregator.by_fault_label(events);

        let down_time: BTreeMap<String, f64> = buckets
            .iter()
            .map(|(label, bucket)| (label.clone(), bucket.total_duration.as_hours()))
            .collect();

        MachineCardReport {
            machine_number,
            down_time,
            total_down_time: total_duration(&buckets).as_hours(),
            shift_hours: window.effective_hours,
        }
    }

    pub fn build_fault_log(&self, machine_number: u32, events: &[FaultEvent]) -> FaultLogReport {
        let mut ordered: Vec<&FaultEvent> = events.iter().collect();
        // 稳定排序; 无时间戳的文件行排在最后
        ordered.sort_by_key(|e| (e.occurred_at.is_none(), e.occurred_at));

        let fault_log = ordered
            .into_iter()
            .map(|e| FaultLogRow {
                date: e
                    .occurred_at
                    .map(|ts| ts.format(LOG_TIMESTAMP_FORMAT).to_string())
                    .unwrap_or_default(),
                fault: e.fault_label.clone(),
                fault_time: e.duration.to_string(),
                operator: e.operator.clone(),
            })
            .collect();

        FaultLogReport {
            machine_number,
            headers: FAULT_LOG_HEADERS.iter().map(|h| h.to_string()).collect(),
            fault_log,
        }
    }

    pub fn build_fault_report(&self, machine_number: u32, events: &[FaultEvent]) -> FaultReport {
        let buckets = self.aggregator.by_fault_label(events);
        let all_secs = total_duration(&buckets).as_secs() as f64;
        let all_count = total_count(&buckets) as f64;

        let fault_report = buckets
            .values()
            .map(|bucket| FaultReportRow {
                fault: bucket.key.clone(),
                count: bucket.count,
                count_share_percent: self.percentage.share_percent(bucket.count as f64, all_count),
                down_hours: round_half_up(bucket.total_duration.as_hours(), PERCENT_DECIMALS),
                // 占比按秒计算,避免先舍入小时再求比
                down_hours_share_percent: self
                    .percentage
                    .share_percent(bucket.total_duration.as_secs() as f64, all_secs),
            })
            .collect();

        FaultReport {
            machine_number,
            total_down_time: round_half_up(all_secs / 3600.0, PERCENT_DECIMALS),
            fault_report,
        }
    }
}
