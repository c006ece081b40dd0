// ==========================================
// 订单工序排程系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::scheduler_config::SchedulerConfig;
use crate::db::open_sqlite_connection;
use crate::engine::strategy::ScheduleStrategy;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::warn;

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const DEFAULT_PIECES_PER_HOUR: &str = "scheduler/default_pieces_per_hour";
    pub const MAX_WINDOW_HOURS: &str = "scheduler/max_window_hours";
    pub const DAY_SHIFT_START_HOUR: &str = "scheduler/day_shift_start_hour";
    pub const DAY_SHIFT_END_HOUR: &str = "scheduler/day_shift_end_hour";
    pub const STRATEGY: &str = "scheduler/strategy";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 读取 global scope 的配置值
    pub fn get_global_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 解析配置值；缺失或格式错误时使用默认值
    fn get_parsed_or<T: FromStr>(&self, key: &str, default: T) -> RepositoryResult<T> {
        match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(key, value = %raw, "配置值格式错误，使用默认值");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    /// 读取排程配置
    ///
    /// 缺失的键取默认值；取值越界时整体退回默认配置
    pub fn get_scheduler_config(&self) -> RepositoryResult<SchedulerConfig> {
        let defaults = SchedulerConfig::default();

        let config = SchedulerConfig {
            default_pieces_per_hour: self
                .get_parsed_or(config_keys::DEFAULT_PIECES_PER_HOUR, defaults.default_pieces_per_hour)?,
            max_window_hours: self.get_parsed_or(config_keys::MAX_WINDOW_HOURS, defaults.max_window_hours)?,
            day_shift_start_hour: self
                .get_parsed_or(config_keys::DAY_SHIFT_START_HOUR, defaults.day_shift_start_hour)?,
            day_shift_end_hour: self.get_parsed_or(config_keys::DAY_SHIFT_END_HOUR, defaults.day_shift_end_hour)?,
            strategy: self.get_parsed_or::<ScheduleStrategy>(config_keys::STRATEGY, defaults.strategy)?,
        };

        if let Err(reason) = config.validate() {
            warn!(%reason, "排程配置无效，使用默认配置");
            return Ok(defaults);
        }
        Ok(config)
    }

    /// 保存排程配置
    pub fn save_scheduler_config(&self, config: &SchedulerConfig) -> RepositoryResult<()> {
        config
            .validate()
            .map_err(RepositoryError::ValidationError)?;

        self.set_global_config_value(
            config_keys::DEFAULT_PIECES_PER_HOUR,
            &config.default_pieces_per_hour.to_string(),
        )?;
        self.set_global_config_value(config_keys::MAX_WINDOW_HOURS, &config.max_window_hours.to_string())?;
        self.set_global_config_value(
            config_keys::DAY_SHIFT_START_HOUR,
            &config.day_shift_start_hour.to_string(),
        )?;
        self.set_global_config_value(config_keys::DAY_SHIFT_END_HOUR, &config.day_shift_end_hour.to_string())?;
        self.set_global_config_value(config_keys::STRATEGY, config.strategy.as_str())?;
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&json!(config_map)).map_err(|e| RepositoryError::InternalError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn memory_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_empty_store_yields_defaults() {
        let manager = memory_manager();
        assert_eq!(manager.get_scheduler_config().unwrap(), SchedulerConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let manager = memory_manager();
        let config = SchedulerConfig {
            default_pieces_per_hour: 25,
            max_window_hours: 48,
            day_shift_start_hour: 8,
            day_shift_end_hour: 20,
            strategy: ScheduleStrategy::BackwardPerOperation,
        };
        manager.save_scheduler_config(&config).unwrap();
        assert_eq!(manager.get_scheduler_config().unwrap(), config);

        let snapshot = manager.get_config_snapshot().unwrap();
        assert!(snapshot.contains("backward_per_operation"));
    }

    #[test]
    fn test_malformed_value_falls_back() {
        let manager = memory_manager();
        manager
            .set_global_config_value(config_keys::DEFAULT_PIECES_PER_HOUR, "lots")
            .unwrap();
        manager
            .set_global_config_value(config_keys::STRATEGY, "backward")
            .unwrap();
        let cfg = manager.get_scheduler_config().unwrap();
        assert_eq!(cfg.default_pieces_per_hour, 10);
        assert_eq!(cfg.strategy, ScheduleStrategy::BackwardPerOperation);
    }

    #[test]
    fn test_out_of_range_hours_fall_back_to_defaults() {
        let manager = memory_manager();
        manager
            .set_global_config_value(config_keys::DAY_SHIFT_START_HOUR, "30")
            .unwrap();
        assert_eq!(manager.get_scheduler_config().unwrap(), SchedulerConfig::default());
    }
}
