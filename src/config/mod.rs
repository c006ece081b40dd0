// ==========================================
// 订单工序排程系统 - 配置层
// ==========================================
// 职责: 排程配置管理,支持覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod scheduler_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use scheduler_config::{SchedulerConfig, DEFAULT_MAX_WINDOW_HOURS};
