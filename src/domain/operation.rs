// ==========================================
// 订单工序排程系统 - 工序领域模型
// ==========================================
// 工序按顺序组成流水线，顺序即先后约束（index 0 为首道工序）
// 同一次排程内工序名称唯一（名称是各阶段之间的关联键）
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// OperationRef - 排程输入中的工序引用
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRef {
    pub name: String,                  // 工序名称
    #[serde(default)]
    pub pieces_per_hour: Option<i64>,  // 每小时产能提示（订单覆盖或工序默认值）
}

impl OperationRef {
    pub fn new(name: impl Into<String>, pieces_per_hour: Option<i64>) -> Self {
        Self {
            name: name.into(),
            pieces_per_hour,
        }
    }

    /// 有效的每小时产能提示（仅正值有效）
    pub fn positive_hint(&self) -> Option<i64> {
        self.pieces_per_hour.filter(|pph| *pph > 0)
    }
}

// ==========================================
// OperationDefinition - 工序目录条目（持久化）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDefinition {
    pub operation_id: i64,
    pub name: String,
    pub default_pieces_per_hour: Option<i64>, // 默认每小时产能
    pub description: Option<String>,
}

impl OperationDefinition {
    /// 结合订单覆盖值生成排程用的工序引用
    ///
    /// 订单覆盖值为正时优先，否则使用工序默认值
    pub fn to_operation_ref(&self, order_override: Option<i64>) -> OperationRef {
        let pph = order_override
            .filter(|v| *v > 0)
            .or(self.default_pieces_per_hour);
        OperationRef::new(self.name.clone(), pph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_override_wins_over_default() {
        let def = OperationDefinition {
            operation_id: 1,
            name: "cut".to_string(),
            default_pieces_per_hour: Some(80),
            description: None,
        };

        assert_eq!(def.to_operation_ref(Some(120)).pieces_per_hour, Some(120));
        assert_eq!(def.to_operation_ref(None).pieces_per_hour, Some(80));
        // 非正覆盖值视为未设置
        assert_eq!(def.to_operation_ref(Some(0)).pieces_per_hour, Some(80));
    }

    #[test]
    fn test_positive_hint_filters_non_positive() {
        assert_eq!(OperationRef::new("pack", Some(-3)).positive_hint(), None);
        assert_eq!(OperationRef::new("pack", Some(15)).positive_hint(), Some(15));
        assert_eq!(OperationRef::new("pack", None).positive_hint(), None);
    }
}
