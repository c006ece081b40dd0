// ==========================================
// 订单工序排程系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行或上层服务调用
// ==========================================

pub mod error;
pub mod schedule_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use schedule_api::ScheduleApi;
pub use validator::OrderRequestValidator;
