// ==========================================
// 订单工序排程系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod capacity;
pub mod operation;
pub mod order;
pub mod schedule;
pub mod types;

// 重导出核心类型
pub use capacity::{ShiftCapacity, WorkshopCapacity};
pub use operation::{OperationDefinition, OperationRef};
pub use order::{OrderOperationInput, OrderRequest};
pub use schedule::{Allocation, DeadlineAssessment, HourSlot, ScheduleResult};
pub use types::Shift;
