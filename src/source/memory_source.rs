// ==========================================
// 针织车间停机统计系统 - 内存事件源
// ==========================================
// 用途: 单元测试、演示数据
// 无时间戳的事件视为窗口当日事件,始终纳入
// ==========================================

use crate::domain::{FaultEvent, ShiftWindow};
use crate::source::{EventSource, SourceResult};

#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSource {
    events: Vec<FaultEvent>,
}

impl InMemoryEventSource {
    pub fn new(events: Vec<FaultEvent>) -> Self {
        Self { events }
    }
}

impl EventSource for InMemoryEventSource {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn fetch(&self, window: &ShiftWindow, machine: Option<u32>) -> SourceResult<Vec<FaultEvent>> {
        Ok(self
            .events
            .iter()
            .filter(|e| machine.map_or(true, |m| e.machine_number == m))
            .filter(|e| e.occurred_at.map_or(true, |ts| window.contains(ts)))
            .cloned()
            .collect())
    }
}
