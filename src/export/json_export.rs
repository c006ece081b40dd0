// ==========================================
// 订单工序排程系统 - JSON 导出
// ==========================================

use crate::domain::schedule::Allocation;
use crate::engine::orchestrator::ScheduleReport;
use crate::export::error::ExportResult;

/// 完整排程报告（格式化输出）
pub fn report_to_json(report: &ScheduleReport) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// 仅分配列表（紧凑格式）
pub fn allocations_to_json(allocations: &[Allocation]) -> ExportResult<String> {
    Ok(serde_json::to_string(allocations)?)
}
