// ==========================================
// 订单工序排程系统 - 良率折算
// ==========================================
// 投入量 = ceil(出货数量 / (估计良率 / 100))
// 良率缺失或非正时按 100% 处理（宽松策略，不视为错误）
// ==========================================

/// 计算所需投入量
///
/// # 参数
/// - shippable_qty: 出货数量
/// - estimated_yield_pct: 估计良率（百分比，例如 98.5）
pub fn required_input(shippable_qty: u64, estimated_yield_pct: Option<f64>) -> u64 {
    match estimated_yield_pct {
        Some(pct) if pct.is_finite() && pct > 0.0 => {
            (shippable_qty as f64 / (pct / 100.0)).ceil() as u64
        }
        _ => shippable_qty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_yield_is_identity() {
        assert_eq!(required_input(500, Some(100.0)), 500);
        assert_eq!(required_input(1, Some(100.0)), 1);
    }

    #[test]
    fn test_partial_yield_rounds_up() {
        assert_eq!(required_input(500, Some(98.5)), 508);
        assert_eq!(required_input(100, Some(50.0)), 200);
        assert_eq!(required_input(10, Some(30.0)), 34);
    }

    #[test]
    fn test_missing_or_non_positive_yield() {
        assert_eq!(required_input(500, None), 500);
        assert_eq!(required_input(500, Some(0.0)), 500);
        assert_eq!(required_input(500, Some(-20.0)), 500);
        assert_eq!(required_input(500, Some(f64::NAN)), 500);
    }
}
