// ==========================================
// 针织车间停机统计系统 - 故障聚合器
// ==========================================
// 输入: 已按时间窗过滤的故障事件（不再二次过滤）
// 输出: 分组键 → 累计停机时长 + 次数
// 红线: 只做加法; 结果与输入顺序无关
// ==========================================

use crate::domain::{FaultDuration, FaultEvent};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::instrument;

// ==========================================
// FaultAggregate - 单个分组的累计值
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultAggregate<K> {
    pub key: K,
    pub total_duration: FaultDuration,
    pub count: u64,
}

impl<K> FaultAggregate<K> {
    fn empty(key: K) -> Self {
        Self {
            key,
            total_duration: FaultDuration::ZERO,
            count: 0,
        }
    }

    fn add(&mut self, event: &FaultEvent) {
        self.total_duration = self.total_duration.saturating_add(event.duration);
        self.count += 1;
    }
}

// ==========================================
// FaultAggregator
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultAggregator;

impl FaultAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 按任意分组键聚合
    ///
    /// 空输入返回空映射; BTreeMap 保证输出顺序稳定
    #[instrument(skip_all, fields(events = events.len()))]
    pub fn aggregate<K, F>(&self, events: &[FaultEvent], key_fn: F) -> BTreeMap<K, FaultAggregate<K>>
    where
        K: Ord + Clone,
        F: Fn(&FaultEvent) -> K,
    {
        let mut buckets: BTreeMap<K, FaultAggregate<K>> = BTreeMap::new();
        for event in events {
            let key = key_fn(event);
            buckets
                .entry(key.clone())
                .or_insert_with(|| FaultAggregate::empty(key))
                .add(event);
        }
        buckets
    }

    /// 总览报表: 按机台号分组
    pub fn by_machine(&self, events: &[FaultEvent]) -> BTreeMap<u32, FaultAggregate<u32>> {
        self.aggregate(events, |e| e.machine_number)
    }

    /// 机台卡片/故障报告: 按故障描述分组
    pub fn by_fault_label(&self, events: &[FaultEvent]) -> BTreeMap<String, FaultAggregate<String>> {
        self.aggregate(events, |e| e.fault_label.clone())
    }
}

/// 全部分组的停机时长合计
pub fn total_duration<K>(buckets: &BTreeMap<K, FaultAggregate<K>>) -> FaultDuration {
    buckets.values().map(|b| b.total_duration).sum()
}

/// 全部分组的次数合计
pub fn total_count<K>(buckets: &BTreeMap<K, FaultAggregate<K>>) -> u64 {
    buckets.values().map(|b| b.count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(machine: u32, label: &str, secs: u64) -> FaultEvent {
        FaultEvent {
            machine_number: machine,
            fault_label: label.to_string(),
            operator: "Alice".to_string(),
            occurred_at: None,
            duration: FaultDuration::from_secs(secs),
        }
    }

    #[test]
    fn test_empty_input_is_empty_mapping() {
        let agg = FaultAggregator::new();
        assert!(agg.by_machine(&[]).is_empty());
        assert!(agg.by_fault_label(&[]).is_empty());
    }

    #[test]
    fn test_by_machine_sums_and_counts() {
        let agg = FaultAggregator::new();
        let events = vec![
            event(3, "Standing", 60),
            event(17, "Standing", 30),
            event(3, "False Stop", 40),
        ];
        let buckets = agg.by_machine(&events);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[&3].total_duration.as_secs(), 100);
        assert_eq!(buckets[&3].count, 2);
        assert_eq!(buckets[&17].key, 17);
        assert_eq!(total_duration(&buckets).as_secs(), 130);
        assert_eq!(total_count(&buckets), 3);
    }

    #[test]
    fn test_order_independent() {
        let agg = FaultAggregator::new();
        let events = vec![
            event(3, "Standing", 60),
            event(3, "False Stop", 45),
            event(3, "Standing", 15),
            event(3, "Needle", 600),
            event(3, "False Stop", 5),
        ];
        let expected = agg.by_fault_label(&events);
        let input_total: u64 = events.iter().map(|e| e.duration.as_secs()).sum();

        // 逐次旋转输入顺序,结果与合计均不变
        let mut rotated = events.clone();
        for _ in 0..events.len() {
            rotated.rotate_left(1);
            let buckets = agg.by_fault_label(&rotated);
            assert_eq!(buckets, expected);
            assert_eq!(total_duration(&buckets).as_secs(), input_total);
        }

        let mut reversed = events.clone();
        reversed.reverse();
        assert_eq!(agg.by_fault_label(&reversed), expected);
    }
}
