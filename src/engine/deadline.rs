// ==========================================
// 订单工序排程系统 - 交期评估
// ==========================================
// 依据排程结果判断是否满足交期；不满足时按末道工序产能线性外推预计完成时间
// 外推是启发式估计，不重新模拟（不考虑 due 之后的班次变化）
// ==========================================

use crate::domain::operation::OperationRef;
use crate::domain::schedule::{DeadlineAssessment, ScheduleResult};
use chrono::{Duration, NaiveDateTime};

/// 评估交期
///
/// # 参数
/// - schedule: 排程结果
/// - required_input_qty: 投入量
/// - due: 交期
/// - last_operation: 末道工序（其每小时产能用于外推）
/// - window_start: 排程起点（末道工序无分配时作为外推基准）
///
/// # 返回
/// - 满足交期: meets_due = meets_due_estimate = true，不给预计完成时间
/// - 末道工序产能缺失或非正: 不估计，meets_due_estimate = false
/// - 外推时间超出日期范围: 同样不估计
pub fn evaluate(
    schedule: &ScheduleResult,
    required_input_qty: u64,
    due: NaiveDateTime,
    last_operation: Option<&OperationRef>,
    window_start: NaiveDateTime,
) -> DeadlineAssessment {
    let meets_due = schedule.total_allocated >= required_input_qty;
    if meets_due {
        return DeadlineAssessment {
            meets_due,
            expected_completion: None,
            meets_due_estimate: true,
        };
    }

    let remaining_qty = required_input_qty - schedule.total_allocated;
    let estimate = last_operation.and_then(|op| {
        let pph = op.positive_hint()? as u64;
        let base = schedule
            .last_hour_end_for(&op.name)
            .unwrap_or(window_start);
        let hours_needed = i64::try_from(remaining_qty.div_ceil(pph)).ok()?;
        base.checked_add_signed(Duration::try_hours(hours_needed)?)
    });

    match estimate {
        Some(expected) => DeadlineAssessment {
            meets_due,
            expected_completion: Some(expected),
            meets_due_estimate: expected <= due,
        },
        None => DeadlineAssessment {
            meets_due,
            expected_completion: None,
            meets_due_estimate: meets_due,
        },
    }
}
