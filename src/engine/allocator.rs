// ==========================================
// 订单工序排程系统 - 小时产能分配器
// ==========================================
// 正向: 从窗口起点按小时向后分配（产能按班次取值）
// 反向: 从窗口终点按小时向前分配（产能按小时取值），用于"尽量晚"排程
// 游标每步固定前进/后退一小时，保证有界终止
// ==========================================

use crate::domain::schedule::HourSlot;
use crate::domain::types::Shift;
use crate::engine::shift::{floor_to_hour, ShiftClassifier};
use chrono::{Duration, NaiveDateTime};

/// 分配结果: (已分配总量, 按时间正序的小时分配)
pub type AllocationOutcome = (u64, Vec<HourSlot>);

/// 单小时可分配量: min(产能, 剩余目标)，产能非正时为 0
fn hour_quantity(capacity: i64, remaining: u64) -> u64 {
    if capacity <= 0 {
        return 0;
    }
    (capacity as u64).min(remaining)
}

// ==========================================
// HourlyAllocator - 小时分配器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct HourlyAllocator {
    classifier: ShiftClassifier,
}

impl HourlyAllocator {
    pub fn new(classifier: ShiftClassifier) -> Self {
        Self { classifier }
    }

    /// 正向分配
    ///
    /// # 参数
    /// - window_start: 窗口起点（向下取整到整点）
    /// - window_end: 窗口终点（不含）
    /// - target_qty: 目标数量
    /// - capacity_fn: 按班次返回每小时产能
    ///
    /// # 返回
    /// 窗口耗尽或目标满足时结束；全程无产能时返回 (0, [])
    pub fn allocate_forward<F>(
        &self,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
        target_qty: u64,
        capacity_fn: F,
    ) -> AllocationOutcome
    where
        F: Fn(Shift) -> i64,
    {
        let mut slots = Vec::new();
        let mut allocated_total = 0u64;
        let mut cursor = floor_to_hour(window_start);

        while cursor < window_end && allocated_total < target_qty {
            let hour_end = cursor + Duration::hours(1);
            let shift = self.classifier.shift_for(cursor);
            let qty = hour_quantity(capacity_fn(shift), target_qty - allocated_total);
            if qty > 0 {
                slots.push(HourSlot {
                    hour_start: cursor,
                    hour_end,
                    shift,
                    quantity: qty,
                });
                allocated_total += qty;
            }
            cursor = hour_end;
        }

        (allocated_total, slots)
    }

    /// 反向分配
    ///
    /// # 参数
    /// - window_start: 窗口起点（不早于此时刻）
    /// - window_end: 窗口终点（向下取整到整点）
    /// - target_qty: 目标数量
    /// - capacity_fn: 按小时起点返回该小时产能
    ///
    /// # 返回
    /// 小时分配按时间正序返回
    pub fn allocate_backward<F>(
        &self,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
        target_qty: u64,
        capacity_fn: F,
    ) -> AllocationOutcome
    where
        F: Fn(NaiveDateTime) -> i64,
    {
        let mut slots = Vec::new();
        let mut allocated_total = 0u64;
        let mut cursor_end = floor_to_hour(window_end);

        while cursor_end > window_start && allocated_total < target_qty {
            let hour_start = cursor_end - Duration::hours(1);
            let qty = hour_quantity(capacity_fn(hour_start), target_qty - allocated_total);
            if qty > 0 {
                slots.push(HourSlot {
                    hour_start,
                    hour_end: cursor_end,
                    shift: self.classifier.shift_for(hour_start),
                    quantity: qty,
                });
                allocated_total += qty;
            }
            cursor_end = hour_start;
        }

        // 收集顺序为由晚到早，翻转为时间正序
        slots.reverse();
        (allocated_total, slots)
    }
}
