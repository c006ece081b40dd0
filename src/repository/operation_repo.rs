// ==========================================
// 订单工序排程系统 - 工序目录仓储
// ==========================================
// 存储: operation 表（名称唯一）
// 订单中的工序名称必须能在目录中找到
// ==========================================

use crate::domain::operation::OperationDefinition;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = "SELECT operation_id, name, default_pieces_per_hour, description FROM operation";

fn map_operation_row(row: &Row<'_>) -> rusqlite::Result<OperationDefinition> {
    Ok(OperationDefinition {
        operation_id: row.get(0)?,
        name: row.get(1)?,
        default_pieces_per_hour: row.get(2)?,
        description: row.get(3)?,
    })
}

// ==========================================
// OperationRepository - 工序目录仓储
// ==========================================
pub struct OperationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OperationRepository {
    /// 创建新的工序仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增工序
    ///
    /// # 返回
    /// - Ok(operation_id)
    /// - Err(UniqueConstraintViolation): 名称已存在
    pub fn create(
        &self,
        name: &str,
        default_pieces_per_hour: Option<i64>,
        description: Option<&str>,
    ) -> RepositoryResult<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RepositoryError::FieldValueError {
                field: "name".to_string(),
                message: "工序名称不能为空".to_string(),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO operation (name, default_pieces_per_hour, description) VALUES (?1, ?2, ?3)",
            params![name, default_pieces_per_hour, description],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, operation_id: i64) -> RepositoryResult<Option<OperationDefinition>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE operation_id = ?1", SELECT_COLUMNS);
        let op = conn
            .query_row(&sql, params![operation_id], map_operation_row)
            .optional()?;
        Ok(op)
    }

    /// 按名称查询（精确匹配）
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<OperationDefinition>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE name = ?1", SELECT_COLUMNS);
        let op = conn
            .query_row(&sql, params![name.trim()], map_operation_row)
            .optional()?;
        Ok(op)
    }

    /// 查询全部工序（按 id 升序）
    pub fn list(&self) -> RepositoryResult<Vec<OperationDefinition>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY operation_id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_operation_row)?;

        let mut ops = Vec::new();
        for row in rows {
            ops.push(row?);
        }
        Ok(ops)
    }

    /// 更新工序默认每小时产能
    pub fn update_default_pieces_per_hour(
        &self,
        operation_id: i64,
        pieces_per_hour: Option<i64>,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE operation SET default_pieces_per_hour = ?1 WHERE operation_id = ?2",
            params![pieces_per_hour, operation_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Operation".to_string(),
                id: operation_id.to_string(),
            });
        }
        Ok(())
    }

    /// 删除工序（级联删除车间产能）
    pub fn delete(&self, operation_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM operation WHERE operation_id = ?1",
            params![operation_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Operation".to_string(),
                id: operation_id.to_string(),
            });
        }
        Ok(())
    }
}
