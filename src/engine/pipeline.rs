// ==========================================
// 订单工序排程系统 - 流水线排程器
// ==========================================
// 输入: 起止时间 + 投入量 + 有序工序列表 + 产能接口
// 输出: 按 (hour_start, operation_name) 排序的分配列表 + 末道工序完成量 + 产能不足说明
// ==========================================
// 先后约束: 工序 i 在小时 H 的累计加工量 <= 工序 i-1 在 H 及之前完成的累计量
// 全函数: 任何输入都不失败，最坏情况返回零/部分结果并附说明
// 每次调用的累加器均为局部变量，可并发调用
// ==========================================

use crate::domain::operation::OperationRef;
use crate::domain::schedule::{Allocation, HourSlot, ScheduleResult};
use crate::engine::allocator::HourlyAllocator;
use crate::engine::capacity::CapacityLookup;
use crate::engine::shift::{floor_to_hour, ShiftClassifier};
use crate::engine::strategy::ScheduleStrategy;
use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

// ==========================================
// PipelineScheduler - 流水线排程器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineScheduler {
    classifier: ShiftClassifier,
    allocator: HourlyAllocator,
}

impl PipelineScheduler {
    pub fn new(classifier: ShiftClassifier) -> Self {
        Self {
            classifier,
            allocator: HourlyAllocator::new(classifier),
        }
    }

    /// 按指定策略排程
    #[instrument(skip(self, operations, capacity), fields(
        strategy = strategy.as_str(),
        operations_count = operations.len()
    ))]
    pub fn schedule(
        &self,
        strategy: ScheduleStrategy,
        start: NaiveDateTime,
        due: NaiveDateTime,
        required_input_qty: u64,
        operations: &[OperationRef],
        capacity: &dyn CapacityLookup,
    ) -> ScheduleResult {
        let result = match strategy {
            ScheduleStrategy::ForwardPipeline => {
                self.schedule_forward(start, due, required_input_qty, operations, capacity)
            }
            ScheduleStrategy::BackwardPerOperation => {
                self.schedule_backward(start, due, required_input_qty, operations, capacity)
            }
        };

        debug!(
            allocations = result.allocations.len(),
            total_allocated = result.total_allocated,
            under_capacity = result.note.is_some(),
            "排程完成"
        );
        result
    }

    /// 正向流水线模拟
    ///
    /// 规则：
    /// 1) 游标从 floor(start) 起每次前进一小时，直到 due（循环次数有界）
    /// 2) 首道工序可用量 = 投入量 - 已加工量
    /// 3) 后续工序可用量 = 上道工序在当前整点前已完成量 - 已加工量
    /// 4) 本小时加工的件在小时结束时才对下道工序可用
    pub fn schedule_forward(
        &self,
        start: NaiveDateTime,
        due: NaiveDateTime,
        required_input_qty: u64,
        operations: &[OperationRef],
        capacity: &dyn CapacityLookup,
    ) -> ScheduleResult {
        if operations.is_empty() {
            return ScheduleResult::default();
        }

        let stage_count = operations.len();
        let mut processed = vec![0u64; stage_count];
        // finished_by_time[i][完成时刻] = 该时刻完成的件数
        let mut finished_by_time: Vec<BTreeMap<NaiveDateTime, u64>> = vec![BTreeMap::new(); stage_count];
        let mut allocations = Vec::new();

        let mut cursor = floor_to_hour(start);
        while cursor < due {
            let hour_end = cursor + Duration::hours(1);

            for (idx, op) in operations.iter().enumerate() {
                let hour_capacity = capacity.capacity(&op.name, cursor);
                let available = if idx == 0 {
                    required_input_qty.saturating_sub(processed[idx])
                } else {
                    let upstream_finished: u64 = finished_by_time[idx - 1]
                        .range(..=cursor)
                        .map(|(_, count)| *count)
                        .sum();
                    upstream_finished.saturating_sub(processed[idx])
                };

                let alloc = if hour_capacity <= 0 {
                    0
                } else {
                    (hour_capacity as u64).min(available)
                };

                if alloc > 0 {
                    allocations.push(Allocation {
                        hour_start: cursor,
                        hour_end,
                        shift: self.classifier.shift_for(cursor),
                        operation_name: op.name.clone(),
                        allocated_quantity: alloc,
                    });
                    processed[idx] += alloc;
                    *finished_by_time[idx].entry(hour_end).or_insert(0) += alloc;
                }
            }

            cursor = hour_end;
        }

        let total_allocated = processed[stage_count - 1];
        finalize(allocations, operations, required_input_qty, total_allocated)
    }

    /// 逐工序倒排
    ///
    /// 规则：
    /// 1) 末道工序从 due 向前尽量晚地分配投入量
    /// 2) 上道工序的窗口终点 = 下道工序最早分配小时的起点，目标 = 下道工序分配量
    /// 3) 正向修剪: 每道工序不超过上道工序的完成量（从最早的小时扣减）
    pub fn schedule_backward(
        &self,
        start: NaiveDateTime,
        due: NaiveDateTime,
        required_input_qty: u64,
        operations: &[OperationRef],
        capacity: &dyn CapacityLookup,
    ) -> ScheduleResult {
        if operations.is_empty() {
            return ScheduleResult::default();
        }

        let stage_count = operations.len();
        let mut stages: Vec<Vec<HourSlot>> = vec![Vec::new(); stage_count];
        let mut window_end = due;
        let mut target = required_input_qty;

        for idx in (0..stage_count).rev() {
            let name = operations[idx].name.as_str();
            let (allocated, slots) = self.allocator.allocate_backward(start, window_end, target, |hour| {
                capacity.capacity(name, hour)
            });
            if let Some(first) = slots.first() {
                window_end = first.hour_start;
            }
            target = allocated;
            stages[idx] = slots;
        }

        let mut limit = required_input_qty;
        for slots in stages.iter_mut() {
            limit = limit.min(slot_total(slots));
            trim_earliest(slots, limit);
        }

        let allocations = stages
            .into_iter()
            .zip(operations)
            .flat_map(|(slots, op)| slots.into_iter().map(move |s| s.into_allocation(&op.name)))
            .collect();

        finalize(allocations, operations, required_input_qty, limit)
    }
}

fn slot_total(slots: &[HourSlot]) -> u64 {
    slots.iter().map(|s| s.quantity).sum()
}

/// 从最早的小时开始扣减，使总量不超过 keep
fn trim_earliest(slots: &mut Vec<HourSlot>, keep: u64) {
    let mut excess = slot_total(slots).saturating_sub(keep);
    for slot in slots.iter_mut() {
        if excess == 0 {
            break;
        }
        let cut = slot.quantity.min(excess);
        slot.quantity -= cut;
        excess -= cut;
    }
    slots.retain(|s| s.quantity > 0);
}

/// 排序并生成产能不足说明
fn finalize(
    mut allocations: Vec<Allocation>,
    operations: &[OperationRef],
    required_input_qty: u64,
    total_allocated: u64,
) -> ScheduleResult {
    allocations.sort_by(|a, b| {
        a.hour_start
            .cmp(&b.hour_start)
            .then_with(|| a.operation_name.cmp(&b.operation_name))
    });

    let note = match operations.last() {
        Some(last) if total_allocated < required_input_qty => Some(format!(
            "Operation '{}' under-capacity: requested {}, allocated {}.",
            last.name, required_input_qty, total_allocated
        )),
        _ => None,
    };

    ScheduleResult {
        allocations,
        total_allocated,
        note,
    }
}
