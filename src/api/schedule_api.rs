// ==========================================
// 订单工序排程系统 - 排程 API
// ==========================================
// 职责: 订单校验 -> 工序目录匹配 -> 产能预取 -> 引擎排程 -> 导出
// 产能数据在排程开始前一次性读取，引擎运行期间不访问存储
// ==========================================

use chrono::NaiveDateTime;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::OrderRequestValidator;
use crate::config::{ConfigManager, SchedulerConfig};
use crate::domain::capacity::ShiftCapacity;
use crate::domain::operation::{OperationDefinition, OperationRef};
use crate::domain::order::OrderRequest;
use crate::engine::aggregate::{summarize, AllocationBucket, Granularity};
use crate::engine::capacity::{
    CapacityChain, CatalogDefaultResolver, ConstantResolver, OrderOverrideResolver,
    ShiftDefaultResolver, WorkshopCapacityResolver,
};
use crate::engine::orchestrator::{ScheduleOrchestrator, ScheduleReport, ScheduleRequest};
use crate::engine::shift::next_hour_start;
use crate::engine::strategy::ScheduleStrategy;
use crate::export;
use crate::repository::{
    NewWorkshopCapacity, OperationRepository, RepositoryError, ShiftCapacityRepository,
    WorkshopCapacityRepository,
};

// ==========================================
// ScheduleApi - 排程 API
// ==========================================

/// 排程API
///
/// 职责：
/// 1. 工序目录与产能数据维护
/// 2. 订单排程（校验 + 产能解析链 + 编排器）
/// 3. 排程结果导出
pub struct ScheduleApi {
    config_manager: Arc<ConfigManager>,
    operation_repo: Arc<OperationRepository>,
    shift_capacity_repo: Arc<ShiftCapacityRepository>,
    workshop_capacity_repo: Arc<WorkshopCapacityRepository>,
}

impl ScheduleApi {
    /// 创建新的ScheduleApi实例
    pub fn new(
        config_manager: Arc<ConfigManager>,
        operation_repo: Arc<OperationRepository>,
        shift_capacity_repo: Arc<ShiftCapacityRepository>,
        workshop_capacity_repo: Arc<WorkshopCapacityRepository>,
    ) -> Self {
        Self {
            config_manager,
            operation_repo,
            shift_capacity_repo,
            workshop_capacity_repo,
        }
    }

    /// 所有仓储共享同一连接
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self::new(
            Arc::new(ConfigManager::from_connection(conn.clone())),
            Arc::new(OperationRepository::from_connection(conn.clone())),
            Arc::new(ShiftCapacityRepository::from_connection(conn.clone())),
            Arc::new(WorkshopCapacityRepository::from_connection(conn)),
        )
    }

    /// 打开数据库文件并初始化表结构
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        crate::db::init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    // ==========================================
    // 目录与产能维护
    // ==========================================

    pub fn register_operation(
        &self,
        name: &str,
        default_pieces_per_hour: Option<i64>,
        description: Option<&str>,
    ) -> ApiResult<i64> {
        // 名称唯一由 operation.name 约束保证
        let id = self
            .operation_repo
            .create(name, default_pieces_per_hour, description)
            .map_err(|e| match e {
                RepositoryError::UniqueConstraintViolation(_) => {
                    ApiError::DuplicateOperation(name.trim().to_string())
                }
                other => other.into(),
            })?;
        info!(operation_id = id, name, "工序已登记");
        Ok(id)
    }

    pub fn list_operations(&self) -> ApiResult<Vec<OperationDefinition>> {
        Ok(self.operation_repo.list()?)
    }

    pub fn set_shift_capacity(&self, capacity: &ShiftCapacity) -> ApiResult<()> {
        if capacity.pieces_per_hour < 0 {
            return Err(ApiError::InvalidInput(format!(
                "班次产能不能为负: {}",
                capacity.pieces_per_hour
            )));
        }
        self.shift_capacity_repo.upsert(capacity)?;
        Ok(())
    }

    pub fn add_workshop_capacity(&self, input: &NewWorkshopCapacity) -> ApiResult<i64> {
        if self.operation_repo.find_by_id(input.operation_id)?.is_none() {
            return Err(ApiError::NotFound(format!(
                "Operation(id={})不存在",
                input.operation_id
            )));
        }
        Ok(self.workshop_capacity_repo.insert(input)?)
    }

    pub fn scheduler_config(&self) -> ApiResult<SchedulerConfig> {
        Ok(self.config_manager.get_scheduler_config()?)
    }

    pub fn save_scheduler_config(&self, config: &SchedulerConfig) -> ApiResult<()> {
        Ok(self.config_manager.save_scheduler_config(config)?)
    }

    // ==========================================
    // 排程
    // ==========================================

    /// 查找订单工序对应的目录条目（保持订单顺序）
    ///
    /// # 返回
    /// - Err(NotFound): 目录中不存在的工序
    pub fn resolve_definitions(&self, order: &OrderRequest) -> ApiResult<Vec<OperationDefinition>> {
        let mut resolved = Vec::with_capacity(order.operations.len());
        for input in &order.operations {
            let def = self
                .operation_repo
                .find_by_name(&input.name)?
                .ok_or_else(|| ApiError::NotFound(format!("工序不存在: {}", input.name)))?;
            resolved.push(def);
        }
        Ok(resolved)
    }

    /// 预取产能数据并组装解析链
    ///
    /// 顺序: 订单覆盖 -> 车间机台产能 -> 工序目录默认 -> 班次默认产能 -> 配置常量
    pub fn build_capacity_chain(
        &self,
        config: &SchedulerConfig,
        order: &OrderRequest,
        definitions: &[OperationDefinition],
    ) -> ApiResult<CapacityChain> {
        let overrides: Vec<OperationRef> = order
            .operations
            .iter()
            .map(|input| OperationRef::new(input.name.clone(), input.pieces_per_hour))
            .collect();
        let mut chain = CapacityChain::new().with(OrderOverrideResolver::from_operations(&overrides));

        if let Some(workshop) = order.workshop.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
            let entries = self.workshop_capacity_repo.find_by_workshop(workshop)?;
            if entries.is_empty() {
                warn!(workshop, "车间无机台产能记录");
            }
            chain = chain.with(WorkshopCapacityResolver::from_entries(&entries));
        }

        let shift_capacities = self.shift_capacity_repo.list_all()?;
        Ok(chain
            .with(CatalogDefaultResolver::from_definitions(definitions))
            .with(ShiftDefaultResolver::new(config.shift_classifier(), &shift_capacities))
            .with(ConstantResolver(config.default_pieces_per_hour)))
    }

    /// 订单排程（使用配置中的默认策略）
    ///
    /// # 参数
    /// - order: 订单请求
    /// - start: 排程起点；None 时取 now 的下一个整点
    /// - now: 当前时刻
    pub fn schedule_order(
        &self,
        order: &OrderRequest,
        start: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> ApiResult<ScheduleReport> {
        self.schedule_order_with_strategy(order, start, now, None)
    }

    /// 订单排程
    ///
    /// # 返回
    /// - Ok(ScheduleReport): 排程报告（可能未满足交期）
    /// - Err(ApiError): 校验失败、工序缺失或存储错误（引擎运行前）
    #[instrument(skip(self, order), fields(quantity = order.quantity, operations = order.operations.len()))]
    pub fn schedule_order_with_strategy(
        &self,
        order: &OrderRequest,
        start: Option<NaiveDateTime>,
        now: NaiveDateTime,
        strategy: Option<ScheduleStrategy>,
    ) -> ApiResult<ScheduleReport> {
        let config = self.config_manager.get_scheduler_config()?;
        let start = start.unwrap_or_else(|| next_hour_start(now));

        OrderRequestValidator::new(config.max_window_hours).validate(order, start)?;

        // 产能提示: 订单覆盖值或工序默认值（末道工序的提示用于交期外推）
        let definitions = self.resolve_definitions(order)?;
        let operations: Vec<OperationRef> = definitions
            .iter()
            .zip(&order.operations)
            .map(|(def, input)| def.to_operation_ref(input.pieces_per_hour))
            .collect();
        let chain = self.build_capacity_chain(&config, order, &definitions)?;

        let request = ScheduleRequest {
            start,
            due: order.due_datetime,
            quantity: order.quantity,
            estimated_yield: order.estimated_yield,
            operations,
        };

        let strategy = strategy.unwrap_or(config.strategy);
        let orchestrator = ScheduleOrchestrator::new(config);
        let report = orchestrator.plan_with_strategy(strategy, &request, &chain);

        info!(
            model = order.internal_model.as_deref().unwrap_or("-"),
            size_inch = order.size_inch(),
            total_allocated = report.schedule.total_allocated,
            meets_due = report.meets_due(),
            "订单排程完成"
        );
        Ok(report)
    }

    // ==========================================
    // 汇总与导出
    // ==========================================

    pub fn summarize(&self, report: &ScheduleReport, granularity: Granularity) -> ApiResult<Vec<AllocationBucket>> {
        let config = self.config_manager.get_scheduler_config()?;
        Ok(summarize(
            &report.schedule.allocations,
            granularity,
            &config.shift_classifier(),
        ))
    }

    pub fn export_csv(&self, report: &ScheduleReport) -> ApiResult<String> {
        Ok(export::allocations_to_csv(&report.schedule.allocations)?)
    }

    pub fn export_localized_csv(&self, report: &ScheduleReport, locale: &str) -> ApiResult<String> {
        Ok(export::allocations_to_localized_csv(
            &report.schedule.allocations,
            locale,
        )?)
    }

    pub fn export_json(&self, report: &ScheduleReport) -> ApiResult<String> {
        Ok(export::report_to_json(report)?)
    }
}
