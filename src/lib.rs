// ==========================================
// 订单工序排程系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 按小时产能分配的订单工序排程与交期评估
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排程规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 导出层 - CSV / JSON
pub mod export;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::Shift;

// 领域实体
pub use domain::{
    Allocation, DeadlineAssessment, OperationDefinition, OperationRef, OrderRequest,
    ScheduleResult, ShiftCapacity, WorkshopCapacity,
};

// 引擎
pub use engine::{
    CapacityChain, CapacityLookup, HourlyAllocator, PipelineScheduler, ScheduleOrchestrator,
    ScheduleReport, ScheduleRequest, ScheduleStrategy, ShiftClassifier,
};

// API
pub use api::{ApiError, ApiResult, ScheduleApi};

// 配置
pub use config::SchedulerConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "订单工序排程系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
