// ==========================================
// 订单工序排程系统 - 排程结果领域模型
// ==========================================
// 分配记录: 一道工序在一个小时内的承诺产量
// 结果对象每次排程新建，调用方消费后即丢弃
// ==========================================

use crate::domain::types::Shift;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Allocation - 小时分配记录
// ==========================================
// 不变量: hour_end = hour_start + 1h, allocated_quantity > 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub hour_start: NaiveDateTime,
    pub hour_end: NaiveDateTime,
    pub shift: Shift,
    pub operation_name: String,
    pub allocated_quantity: u64,
}

// ==========================================
// HourSlot - 单工序的小时分配（分配器输出）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourSlot {
    pub hour_start: NaiveDateTime,
    pub hour_end: NaiveDateTime,
    pub shift: Shift,
    pub quantity: u64,
}

impl HourSlot {
    /// 挂到指定工序下，生成分配记录
    pub fn into_allocation(self, operation_name: &str) -> Allocation {
        Allocation {
            hour_start: self.hour_start,
            hour_end: self.hour_end,
            shift: self.shift,
            operation_name: operation_name.to_string(),
            allocated_quantity: self.quantity,
        }
    }
}

// ==========================================
// ScheduleResult - 排程结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// 按 (hour_start, operation_name) 排序
    pub allocations: Vec<Allocation>,
    /// 末道工序累计完成量（唯一权威的完成量口径）
    pub total_allocated: u64,
    /// 产能不足说明
    pub note: Option<String>,
}

impl ScheduleResult {
    /// 指定工序的分配记录
    pub fn allocations_for<'a>(&'a self, operation_name: &'a str) -> impl Iterator<Item = &'a Allocation> + 'a {
        self.allocations
            .iter()
            .filter(move |a| a.operation_name == operation_name)
    }

    /// 指定工序的累计分配量
    pub fn allocated_for(&self, operation_name: &str) -> u64 {
        self.allocations_for(operation_name)
            .map(|a| a.allocated_quantity)
            .sum()
    }

    /// 指定工序最后一个分配小时的结束时刻
    pub fn last_hour_end_for(&self, operation_name: &str) -> Option<NaiveDateTime> {
        self.allocations_for(operation_name).map(|a| a.hour_end).max()
    }
}

// ==========================================
// DeadlineAssessment - 交期评估
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineAssessment {
    pub meets_due: bool,
    pub expected_completion: Option<NaiveDateTime>,
    pub meets_due_estimate: bool,
}
