// ==========================================
// 订单工序排程系统 - 引擎层
// ==========================================
// 职责: 班次判定、小时分配、流水线排程、良率折算、交期评估
// 红线: Engine 不拼 SQL, 不访问存储, 任何输入都不失败
// ==========================================

pub mod aggregate;
pub mod allocator;
pub mod capacity;
pub mod deadline;
pub mod orchestrator;
pub mod pipeline;
pub mod shift;
pub mod strategy;
pub mod yield_adjust;

// 重导出核心引擎
pub use aggregate::{summarize, AllocationBucket, Granularity};
pub use allocator::{AllocationOutcome, HourlyAllocator};
pub use capacity::{
    CapacityChain, CapacityLookup, CapacityResolver, CatalogDefaultResolver, ConstantResolver,
    OrderOverrideResolver, ShiftDefaultResolver, WorkshopCapacityResolver, DEFAULT_PIECES_PER_HOUR,
};
pub use orchestrator::{ScheduleOrchestrator, ScheduleReport, ScheduleRequest};
pub use pipeline::PipelineScheduler;
pub use shift::{floor_to_hour, next_hour_start, ShiftClassifier};
pub use strategy::ScheduleStrategy;
pub use yield_adjust::required_input;
