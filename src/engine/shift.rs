// ==========================================
// 订单工序排程系统 - 班次分类器
// ==========================================
// 白班: [day_start_hour, day_end_hour)，默认 08:00 - 19:00
// 夜班: 其余所有小时（含 19:00 - 20:00 边界小时）
// 纯函数，无副作用，无失败分支
// ==========================================

use crate::domain::types::Shift;
use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DAY_START_HOUR: u32 = 8;
pub const DEFAULT_DAY_END_HOUR: u32 = 19;

// ==========================================
// ShiftClassifier - 班次分类器
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftClassifier {
    pub day_start_hour: u32,
    pub day_end_hour: u32,
}

impl ShiftClassifier {
    pub fn new(day_start_hour: u32, day_end_hour: u32) -> Self {
        Self {
            day_start_hour,
            day_end_hour,
        }
    }

    /// 判断某一时刻所属班次
    ///
    /// 白班窗口跨零点（start > end）时按环绕处理；start == end 时没有白班小时
    pub fn shift_for(&self, instant: NaiveDateTime) -> Shift {
        if self.is_day_hour(instant.hour()) {
            Shift::Day
        } else {
            Shift::Night
        }
    }

    fn is_day_hour(&self, hour: u32) -> bool {
        let (start, end) = (self.day_start_hour, self.day_end_hour);
        if start < end {
            start <= hour && hour < end
        } else if start > end {
            hour >= start || hour < end
        } else {
            false
        }
    }

    /// 班次归属日期: 该小时所在班次开始的日历日期
    ///
    /// 班次在前一天开始（如夜班凌晨部分、跨零点白班的凌晨部分）时归属前一天
    pub fn shift_date(&self, instant: NaiveDateTime) -> chrono::NaiveDate {
        let date = instant.date();
        let shift_begin_hour = match self.shift_for(instant) {
            Shift::Day => self.day_start_hour,
            Shift::Night => self.day_end_hour % 24,
        };
        if instant.hour() < shift_begin_hour {
            date.pred_opt().unwrap_or(date)
        } else {
            date
        }
    }
}

impl Default for ShiftClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_DAY_START_HOUR, DEFAULT_DAY_END_HOUR)
    }
}

/// 按默认班次窗口分类
pub fn shift_for(instant: NaiveDateTime) -> Shift {
    ShiftClassifier::default().shift_for(instant)
}

/// 向下取整到整点
pub fn floor_to_hour(instant: NaiveDateTime) -> NaiveDateTime {
    let past_hour = Duration::seconds(i64::from(instant.minute() * 60 + instant.second()))
        + Duration::nanoseconds(i64::from(instant.nanosecond()));
    instant - past_hour
}

/// 下一个整点（排程默认起点：当前时刻所在小时的下一小时）
pub fn next_hour_start(now: NaiveDateTime) -> NaiveDateTime {
    floor_to_hour(now) + Duration::hours(1)
}
