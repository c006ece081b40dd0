// ==========================================
// 订单工序排程系统 - 产能解析
// ==========================================
// 统一接口: (工序名称, 小时起点) -> 每小时件数
// 解析链: 订单覆盖 -> 车间机台产能 -> 工序目录默认 -> 班次默认产能 -> 常量默认值
// 链上第一个给出结果的解析器生效
// ==========================================

use crate::domain::capacity::{ShiftCapacity, WorkshopCapacity};
use crate::domain::operation::{OperationDefinition, OperationRef};
use crate::domain::types::Shift;
use crate::engine::shift::ShiftClassifier;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// 默认每小时产能（无任何产能数据时）
pub const DEFAULT_PIECES_PER_HOUR: i64 = 10;

// ==========================================
// Trait: CapacityLookup
// ==========================================
// 用途: 排程器消费的唯一产能接口；返回值 <= 0 表示该小时无产能
pub trait CapacityLookup {
    fn capacity(&self, operation_name: &str, hour_start: NaiveDateTime) -> i64;
}

impl<F> CapacityLookup for F
where
    F: Fn(&str, NaiveDateTime) -> i64,
{
    fn capacity(&self, operation_name: &str, hour_start: NaiveDateTime) -> i64 {
        self(operation_name, hour_start)
    }
}

// ==========================================
// Trait: CapacityResolver
// ==========================================
// 用途: 解析链中的单个产能来源；None 表示交给下一个来源
pub trait CapacityResolver: Send + Sync {
    fn resolve(&self, operation_name: &str, hour_start: NaiveDateTime) -> Option<i64>;

    /// 来源名称（日志用）
    fn source_name(&self) -> &'static str;
}

// ==========================================
// OrderOverrideResolver - 订单级覆盖
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct OrderOverrideResolver {
    overrides: HashMap<String, i64>,
}

impl OrderOverrideResolver {
    /// 从工序引用中收集正的产能提示
    pub fn from_operations(operations: &[OperationRef]) -> Self {
        let overrides = operations
            .iter()
            .filter_map(|op| op.positive_hint().map(|pph| (op.name.clone(), pph)))
            .collect();
        Self { overrides }
    }
}

impl CapacityResolver for OrderOverrideResolver {
    fn resolve(&self, operation_name: &str, _hour_start: NaiveDateTime) -> Option<i64> {
        self.overrides.get(operation_name).copied()
    }

    fn source_name(&self) -> &'static str {
        "order_override"
    }
}

// ==========================================
// WorkshopCapacityResolver - 车间机台产能
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct WorkshopCapacityResolver {
    per_operation: HashMap<String, i64>,
}

impl WorkshopCapacityResolver {
    /// 按工序名称汇总车间内各机台产能
    ///
    /// # 参数
    /// - entries: (工序名称, 机台产能) 列表
    pub fn from_entries(entries: &[(String, WorkshopCapacity)]) -> Self {
        let mut per_operation: HashMap<String, i64> = HashMap::new();
        for (operation_name, cap) in entries {
            *per_operation.entry(operation_name.clone()).or_insert(0) += cap.whole_pieces_per_hour();
        }
        per_operation.retain(|_, pph| *pph > 0);
        Self { per_operation }
    }
}

impl CapacityResolver for WorkshopCapacityResolver {
    fn resolve(&self, operation_name: &str, _hour_start: NaiveDateTime) -> Option<i64> {
        self.per_operation.get(operation_name).copied()
    }

    fn source_name(&self) -> &'static str {
        "workshop_capacity"
    }
}

// ==========================================
// CatalogDefaultResolver - 工序目录默认产能
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct CatalogDefaultResolver {
    defaults: HashMap<String, i64>,
}

impl CatalogDefaultResolver {
    /// 收集目录中为正的默认每小时产能
    pub fn from_definitions(definitions: &[OperationDefinition]) -> Self {
        let defaults = definitions
            .iter()
            .filter_map(|def| {
                def.default_pieces_per_hour
                    .filter(|pph| *pph > 0)
                    .map(|pph| (def.name.clone(), pph))
            })
            .collect();
        Self { defaults }
    }
}

impl CapacityResolver for CatalogDefaultResolver {
    fn resolve(&self, operation_name: &str, _hour_start: NaiveDateTime) -> Option<i64> {
        self.defaults.get(operation_name).copied()
    }

    fn source_name(&self) -> &'static str {
        "catalog_default"
    }
}

// ==========================================
// ShiftDefaultResolver - 班次默认产能
// ==========================================
#[derive(Debug, Clone)]
pub struct ShiftDefaultResolver {
    classifier: ShiftClassifier,
    defaults: HashMap<Shift, i64>,
}

impl ShiftDefaultResolver {
    pub fn new(classifier: ShiftClassifier, capacities: &[ShiftCapacity]) -> Self {
        let defaults = capacities
            .iter()
            .map(|c| (c.shift, c.pieces_per_hour))
            .collect();
        Self {
            classifier,
            defaults,
        }
    }
}

impl CapacityResolver for ShiftDefaultResolver {
    fn resolve(&self, _operation_name: &str, hour_start: NaiveDateTime) -> Option<i64> {
        let shift = self.classifier.shift_for(hour_start);
        self.defaults.get(&shift).copied()
    }

    fn source_name(&self) -> &'static str {
        "shift_default"
    }
}

// ==========================================
// ConstantResolver - 常量兜底
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct ConstantResolver(pub i64);

impl Default for ConstantResolver {
    fn default() -> Self {
        Self(DEFAULT_PIECES_PER_HOUR)
    }
}

impl CapacityResolver for ConstantResolver {
    fn resolve(&self, _operation_name: &str, _hour_start: NaiveDateTime) -> Option<i64> {
        Some(self.0)
    }

    fn source_name(&self) -> &'static str {
        "constant_default"
    }
}

// ==========================================
// CapacityChain - 产能解析链
// ==========================================
#[derive(Default)]
pub struct CapacityChain {
    resolvers: Vec<Box<dyn CapacityResolver>>,
}

impl CapacityChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加解析器（越早追加优先级越高）
    pub fn with(mut self, resolver: impl CapacityResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// 解析并返回生效的来源名称
    pub fn resolve_with_source(
        &self,
        operation_name: &str,
        hour_start: NaiveDateTime,
    ) -> Option<(i64, &'static str)> {
        self.resolvers.iter().find_map(|r| {
            r.resolve(operation_name, hour_start)
                .map(|pph| (pph, r.source_name()))
        })
    }
}

impl CapacityLookup for CapacityChain {
    fn capacity(&self, operation_name: &str, hour_start: NaiveDateTime) -> i64 {
        match self.resolve_with_source(operation_name, hour_start) {
            Some((pph, source)) => {
                tracing::trace!(operation = operation_name, %hour_start, pph, source, "产能解析");
                pph
            }
            None => 0,
        }
    }
}
