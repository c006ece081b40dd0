// ==========================================
// 订单工序排程系统 - 分配汇总
// ==========================================
// 将小时分配按 小时 / 班次 / 天 三种粒度汇总（甘特图、报表使用）
// 班次归属日期: 夜班凌晨部分归属前一天
// ==========================================

use crate::domain::schedule::Allocation;
use crate::domain::types::Shift;
use crate::engine::shift::ShiftClassifier;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 时间粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Hour,
    Shift,
    Day,
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hour" => Ok(Granularity::Hour),
            "shift" => Ok(Granularity::Shift),
            "day" => Ok(Granularity::Day),
            other => Err(format!("未知时间粒度: {}", other)),
        }
    }
}

/// 汇总桶
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationBucket {
    pub date: NaiveDate,
    pub shift: Option<Shift>, // 仅 Hour / Shift 粒度有值
    pub first_hour: NaiveDateTime,
    pub last_hour_end: NaiveDateTime,
    pub operation_name: String,
    pub allocated: u64,
    pub hours: u32, // 有分配的小时数
}

impl AllocationBucket {
    /// 展示标签，例如 "01-02 08:00" / "01-02 NIGHT" / "01-02"
    pub fn label(&self, granularity: Granularity) -> String {
        match granularity {
            Granularity::Hour => self.first_hour.format("%m-%d %H:%M").to_string(),
            Granularity::Shift => format!(
                "{} {}",
                self.date.format("%m-%d"),
                self.shift.map(|s| s.as_str()).unwrap_or("-")
            ),
            Granularity::Day => self.date.format("%m-%d").to_string(),
        }
    }
}

/// 按粒度汇总，输出按 (桶起点, 工序名称) 排序
pub fn summarize(
    allocations: &[Allocation],
    granularity: Granularity,
    classifier: &ShiftClassifier,
) -> Vec<AllocationBucket> {
    // 键: (日期, 班次序, 小时起点, 工序)；非 Hour 粒度时小时起点固定为 None 以合并
    let mut buckets: BTreeMap<(NaiveDate, Option<Shift>, Option<NaiveDateTime>, String), AllocationBucket> =
        BTreeMap::new();

    for alloc in allocations {
        let (date, shift, hour) = match granularity {
            Granularity::Hour => (alloc.hour_start.date(), Some(alloc.shift), Some(alloc.hour_start)),
            Granularity::Shift => (classifier.shift_date(alloc.hour_start), Some(alloc.shift), None),
            Granularity::Day => (alloc.hour_start.date(), None, None),
        };

        let key = (date, shift, hour, alloc.operation_name.clone());
        let bucket = buckets.entry(key).or_insert_with(|| AllocationBucket {
            date,
            shift,
            first_hour: alloc.hour_start,
            last_hour_end: alloc.hour_end,
            operation_name: alloc.operation_name.clone(),
            allocated: 0,
            hours: 0,
        });
        bucket.first_hour = bucket.first_hour.min(alloc.hour_start);
        bucket.last_hour_end = bucket.last_hour_end.max(alloc.hour_end);
        bucket.allocated += alloc.allocated_quantity;
        bucket.hours += 1;
    }

    let mut out: Vec<AllocationBucket> = buckets.into_values().collect();
    out.sort_by(|a, b| {
        a.first_hour
            .cmp(&b.first_hour)
            .then_with(|| a.operation_name.cmp(&b.operation_name))
    });
    out
}
