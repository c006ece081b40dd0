// ==========================================
// 订单工序排程系统 - 订单请求模型
// ==========================================
// 由上层（HTTP/表单）解析后传入，本子系统不持久化订单
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 订单中的单道工序（按 routing 顺序排列）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderOperationInput {
    pub name: String,
    /// 订单级每小时产能覆盖
    #[serde(default)]
    pub pieces_per_hour: Option<i64>,
}

/// 订单排程请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    pub internal_model: Option<String>, // 内部型号
    pub length_mm: f64,
    #[serde(default)]
    pub width_mm: Option<f64>,
    pub quantity: u64,                  // 出货数量
    #[serde(default)]
    pub estimated_yield: Option<f64>,   // 估计良率（百分比，例如 98.5）
    pub due_datetime: NaiveDateTime,
    #[serde(default)]
    pub workshop: Option<String>,       // 车间
    #[serde(default)]
    pub operations: Vec<OrderOperationInput>,
}

impl OrderRequest {
    /// 产品尺寸（英寸）: sqrt(length² + width²) / 25.4
    pub fn size_inch(&self) -> f64 {
        let width = self.width_mm.unwrap_or(0.0);
        (self.length_mm.powi(2) + width.powi(2)).sqrt() / 25.4
    }
}
