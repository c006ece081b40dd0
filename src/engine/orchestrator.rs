// ==========================================
// 订单工序排程系统 - 引擎编排器
// ==========================================
// 主流程: 良率折算 -> 流水线排程 -> 交期评估 -> 报表统计
// 编排器不访问存储；产能由调用方以 CapacityLookup 形式注入
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::operation::OperationRef;
use crate::domain::schedule::{DeadlineAssessment, ScheduleResult};
use crate::engine::capacity::CapacityLookup;
use crate::engine::deadline;
use crate::engine::pipeline::PipelineScheduler;
use crate::engine::shift::floor_to_hour;
use crate::engine::strategy::ScheduleStrategy;
use crate::engine::yield_adjust::required_input;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

// ==========================================
// ScheduleRequest - 排程请求（已校验）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub start: NaiveDateTime,
    pub due: NaiveDateTime,
    /// 出货数量
    pub quantity: u64,
    /// 估计良率（百分比）
    pub estimated_yield: Option<f64>,
    /// 按 routing 顺序排列的工序
    pub operations: Vec<OperationRef>,
}

// ==========================================
// ScheduleReport - 排程报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub strategy: ScheduleStrategy,
    pub requested_quantity: u64,
    pub estimated_yield: Option<f64>,
    /// 良率折算后的投入量
    pub required_input: u64,
    pub schedule: ScheduleResult,
    pub deadline: DeadlineAssessment,
    /// 完成率（百分比），投入量为 0 时为 0
    pub allocated_pct: f64,
    /// 未满足交期时的缺口，满足时为 0
    pub remaining: u64,
}

impl ScheduleReport {
    pub fn meets_due(&self) -> bool {
        self.deadline.meets_due
    }
}

// ==========================================
// ScheduleOrchestrator - 引擎编排器
// ==========================================
#[derive(Debug, Clone)]
pub struct ScheduleOrchestrator {
    config: SchedulerConfig,
    scheduler: PipelineScheduler,
}

impl ScheduleOrchestrator {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - config: 排程配置（班次窗口、默认策略）
    pub fn new(config: SchedulerConfig) -> Self {
        let scheduler = PipelineScheduler::new(config.shift_classifier());
        Self { config, scheduler }
    }

    /// 使用配置中的默认策略排程
    pub fn plan(&self, request: &ScheduleRequest, capacity: &dyn CapacityLookup) -> ScheduleReport {
        self.plan_with_strategy(self.config.strategy, request, capacity)
    }

    /// 执行完整排程流程
    ///
    /// # 参数
    /// - strategy: 排程策略
    /// - request: 已校验的排程请求
    /// - capacity: 产能接口
    ///
    /// # 返回
    /// 排程报告（任何输入都有结果，不报错）
    #[instrument(skip(self, request, capacity), fields(
        strategy = strategy.as_str(),
        quantity = request.quantity,
        operations_count = request.operations.len()
    ))]
    pub fn plan_with_strategy(
        &self,
        strategy: ScheduleStrategy,
        request: &ScheduleRequest,
        capacity: &dyn CapacityLookup,
    ) -> ScheduleReport {
        // ===== 步骤1: 良率折算 =====
        let required = required_input(request.quantity, request.estimated_yield);

        // ===== 步骤2: 流水线排程 =====
        let schedule = self.scheduler.schedule(
            strategy,
            request.start,
            request.due,
            required,
            &request.operations,
            capacity,
        );

        // ===== 步骤3: 交期评估 =====
        let assessment = deadline::evaluate(
            &schedule,
            required,
            request.due,
            request.operations.last(),
            floor_to_hour(request.start),
        );

        // ===== 步骤4: 报表统计 =====
        let allocated_pct = if required == 0 {
            0.0
        } else {
            schedule.total_allocated as f64 / required as f64 * 100.0
        };
        let remaining = if assessment.meets_due {
            0
        } else {
            required.saturating_sub(schedule.total_allocated)
        };

        info!(
            required_input = required,
            total_allocated = schedule.total_allocated,
            meets_due = assessment.meets_due,
            meets_due_estimate = assessment.meets_due_estimate,
            "排程完成"
        );

        ScheduleReport {
            strategy,
            requested_quantity: request.quantity,
            estimated_yield: request.estimated_yield,
            required_input: required,
            schedule,
            deadline: assessment,
            allocated_pct,
            remaining,
        }
    }
}

impl Default for ScheduleOrchestrator {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
