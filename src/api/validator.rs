// ==========================================
// 订单工序排程系统 - 订单请求校验器
// ==========================================
// 职责: 排程前的调用方校验（引擎本身不报错）
// 规则: 数量、尺寸、工序列表、良率、排程窗口
// ==========================================

use chrono::NaiveDateTime;
use std::collections::HashSet;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::order::OrderRequest;
use crate::engine::shift::floor_to_hour;

// ==========================================
// OrderRequestValidator - 订单请求校验器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct OrderRequestValidator {
    max_window_hours: i64,
}

impl OrderRequestValidator {
    pub fn new(max_window_hours: i64) -> Self {
        Self { max_window_hours }
    }

    /// 校验订单请求
    ///
    /// # 参数
    /// - order: 订单请求
    /// - start: 排程起点
    ///
    /// # 返回
    /// - Ok(()): 校验通过
    /// - Err(ApiError): 第一个不满足的规则
    pub fn validate(&self, order: &OrderRequest, start: NaiveDateTime) -> ApiResult<()> {
        if order.quantity == 0 {
            return Err(ApiError::InvalidInput("出货数量必须大于0".to_string()));
        }

        if !order.length_mm.is_finite() || order.length_mm <= 0.0 {
            return Err(ApiError::InvalidInput(format!(
                "长度必须为正数: {}",
                order.length_mm
            )));
        }
        if let Some(width) = order.width_mm {
            if !width.is_finite() || width < 0.0 {
                return Err(ApiError::InvalidInput(format!("宽度无效: {}", width)));
            }
        }

        // 非正良率按 100% 处理；超过 100% 或非数值视为输入错误
        if let Some(pct) = order.estimated_yield {
            if !pct.is_finite() || pct > 100.0 {
                return Err(ApiError::InvalidInput(format!("估计良率无效: {}", pct)));
            }
        }

        self.validate_operation_names(order.operations.iter().map(|op| op.name.as_str()))?;
        self.validate_window(start, order.due_datetime)
    }

    /// 工序列表非空、名称非空且不重复（名称是工序间的连接键）
    pub fn validate_operation_names<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> ApiResult<()> {
        let mut seen = HashSet::new();
        for name in names {
            let name = name.trim();
            if name.is_empty() {
                return Err(ApiError::InvalidInput("工序名称不能为空".to_string()));
            }
            if !seen.insert(name) {
                return Err(ApiError::DuplicateOperation(name.to_string()));
            }
        }
        if seen.is_empty() {
            return Err(ApiError::InvalidInput("订单至少需要一道工序".to_string()));
        }
        Ok(())
    }

    /// 交期必须晚于起点，窗口小时数不超过上限
    pub fn validate_window(&self, start: NaiveDateTime, due: NaiveDateTime) -> ApiResult<()> {
        if due <= start {
            return Err(ApiError::InvalidInput(format!(
                "交期({})必须晚于排程起点({})",
                due, start
            )));
        }

        let span = due - floor_to_hour(start);
        let mut hours = span.num_hours();
        if span > chrono::Duration::hours(hours) {
            hours += 1;
        }
        if hours > self.max_window_hours {
            return Err(ApiError::WindowTooLarge {
                hours,
                max: self.max_window_hours,
            });
        }
        Ok(())
    }
}
