use crate::engine::capacity::DEFAULT_PIECES_PER_HOUR;
use crate::engine::shift::{ShiftClassifier, DEFAULT_DAY_END_HOUR, DEFAULT_DAY_START_HOUR};
use crate::engine::strategy::ScheduleStrategy;
use serde::{Deserialize, Serialize};

/// 排程窗口默认上限（小时）：92 天
pub const DEFAULT_MAX_WINDOW_HOURS: i64 = 24 * 92;

/// 排程配置
///
/// 存储位置：config_kv（scope_id='global'，key='scheduler/{字段名}'）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// 解析链末端的常量产能（件/小时）
    #[serde(default = "default_pieces_per_hour")]
    pub default_pieces_per_hour: i64,

    /// 允许的最长排程窗口（小时），超出由调用方拒绝
    #[serde(default = "default_max_window_hours")]
    pub max_window_hours: i64,

    /// 白班起始小时（含）
    #[serde(default = "default_day_start")]
    pub day_shift_start_hour: u32,

    /// 白班结束小时（不含）
    #[serde(default = "default_day_end")]
    pub day_shift_end_hour: u32,

    #[serde(default)]
    pub strategy: ScheduleStrategy,
}

fn default_pieces_per_hour() -> i64 {
    DEFAULT_PIECES_PER_HOUR
}

fn default_max_window_hours() -> i64 {
    DEFAULT_MAX_WINDOW_HOURS
}

fn default_day_start() -> u32 {
    DEFAULT_DAY_START_HOUR
}

fn default_day_end() -> u32 {
    DEFAULT_DAY_END_HOUR
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_pieces_per_hour: DEFAULT_PIECES_PER_HOUR,
            max_window_hours: DEFAULT_MAX_WINDOW_HOURS,
            day_shift_start_hour: DEFAULT_DAY_START_HOUR,
            day_shift_end_hour: DEFAULT_DAY_END_HOUR,
            strategy: ScheduleStrategy::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn shift_classifier(&self) -> ShiftClassifier {
        ShiftClassifier::new(self.day_shift_start_hour, self.day_shift_end_hour)
    }

    /// 校验配置取值范围
    pub fn validate(&self) -> Result<(), String> {
        if self.day_shift_start_hour > 23 || self.day_shift_end_hour > 24 {
            return Err(format!(
                "白班小时越界: start={}, end={}",
                self.day_shift_start_hour, self.day_shift_end_hour
            ));
        }
        if self.max_window_hours <= 0 {
            return Err(format!("max_window_hours 必须为正: {}", self.max_window_hours));
        }
        Ok(())
    }
}
