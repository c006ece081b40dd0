// ==========================================
// 订单工序排程系统 - 产能领域模型
// ==========================================
// 班次默认产能: 按 DAY/NIGHT 提供每小时件数
// 车间机台产能: 按机台数量与节拍折算每小时件数
// ==========================================

use crate::domain::types::Shift;
use serde::{Deserialize, Serialize};

// ==========================================
// ShiftCapacity - 班次默认产能
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftCapacity {
    pub shift: Shift,
    pub pieces_per_hour: i64,        // 每小时产能（件）
    pub description: Option<String>, // 描述
}

// ==========================================
// WorkshopCapacity - 车间机台产能
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkshopCapacity {
    pub id: i64,
    pub workshop: String,      // 车间
    pub operation_id: i64,     // 工序ID
    pub machine_name: String,  // 机台名称
    pub machine_count: i64,    // 机台数量
    pub cycle_time_s: f64,     // 生产节拍（秒/件）
    pub capacity_per_hour: f64, // 每小时产能（件/小时）
}

impl WorkshopCapacity {
    /// 按机台数量与节拍计算每小时产能
    ///
    /// # 返回
    /// machine_count * 3600 / cycle_time_s；节拍非正或非有限时返回 0
    pub fn derive_capacity_per_hour(machine_count: i64, cycle_time_s: f64) -> f64 {
        if !cycle_time_s.is_finite() || cycle_time_s <= 0.0 || machine_count <= 0 {
            return 0.0;
        }
        machine_count as f64 * 3600.0 / cycle_time_s
    }

    /// 排程使用的整件产能（向下取整）
    pub fn whole_pieces_per_hour(&self) -> i64 {
        if !self.capacity_per_hour.is_finite() || self.capacity_per_hour <= 0.0 {
            return 0;
        }
        self.capacity_per_hour.floor() as i64
    }
}
