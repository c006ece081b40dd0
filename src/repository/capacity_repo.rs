// ==========================================
// 订单工序排程系统 - 产能数据仓储
// ==========================================
// 班次默认产能: shift_capacity 表
// 车间机台产能: workshop_capacity 表
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::capacity::{ShiftCapacity, WorkshopCapacity};
use crate::domain::types::Shift;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

fn map_shift_capacity_row(row: &Row<'_>) -> rusqlite::Result<ShiftCapacity> {
    let shift_raw: String = row.get(0)?;
    let shift = shift_raw
        .parse::<Shift>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, e.into()))?;
    Ok(ShiftCapacity {
        shift,
        pieces_per_hour: row.get(1)?,
        description: row.get(2)?,
    })
}

// ==========================================
// ShiftCapacityRepository - 班次产能仓储
// ==========================================
pub struct ShiftCapacityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ShiftCapacityRepository {
    /// 创建新的班次产能仓储实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入班次产能（存在则覆盖）
    pub fn upsert(&self, capacity: &ShiftCapacity) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO shift_capacity (shift, pieces_per_hour, description)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(shift) DO UPDATE SET
                pieces_per_hour = excluded.pieces_per_hour,
                description = excluded.description
            "#,
            params![capacity.shift.as_str(), capacity.pieces_per_hour, capacity.description],
        )?;
        Ok(())
    }

    /// 按班次查询
    ///
    /// # 返回
    /// - Ok(None): 该班次没有产能记录（由解析链继续兜底）
    pub fn find_by_shift(&self, shift: Shift) -> RepositoryResult<Option<ShiftCapacity>> {
        let conn = self.get_conn()?;
        let capacity = conn
            .query_row(
                "SELECT shift, pieces_per_hour, description FROM shift_capacity WHERE shift = ?1",
                params![shift.as_str()],
                map_shift_capacity_row,
            )
            .optional()?;
        Ok(capacity)
    }

    /// 查询全部班次产能
    pub fn list_all(&self) -> RepositoryResult<Vec<ShiftCapacity>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT shift, pieces_per_hour, description FROM shift_capacity ORDER BY shift")?;
        let rows = stmt.query_map([], map_shift_capacity_row)?;
        let mut capacities = Vec::new();
        for row in rows {
            capacities.push(row?);
        }
        Ok(capacities)
    }

    /// 删除班次产能
    pub fn delete(&self, shift: Shift) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM shift_capacity WHERE shift = ?1", params![shift.as_str()])?;
        Ok(affected)
    }
}

// ==========================================
// WorkshopCapacityRepository - 车间机台产能仓储
// ==========================================
pub struct WorkshopCapacityRepository {
    conn: Arc<Mutex<Connection>>,
}

/// 车间机台产能写入参数
#[derive(Debug, Clone)]
pub struct NewWorkshopCapacity {
    pub workshop: String,
    pub operation_id: i64,
    pub machine_name: String,
    pub machine_count: i64,
    pub cycle_time_s: f64,
}

fn map_workshop_row(row: &Row<'_>) -> rusqlite::Result<WorkshopCapacity> {
    Ok(WorkshopCapacity {
        id: row.get(0)?,
        workshop: row.get(1)?,
        operation_id: row.get(2)?,
        machine_name: row.get(3)?,
        machine_count: row.get(4)?,
        cycle_time_s: row.get(5)?,
        capacity_per_hour: row.get(6)?,
    })
}

impl WorkshopCapacityRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增机台产能，capacity_per_hour 由机台数量与节拍计算
    ///
    /// # 返回
    /// 新记录 id
    pub fn insert(&self, input: &NewWorkshopCapacity) -> RepositoryResult<i64> {
        if input.machine_count <= 0 || !(input.cycle_time_s > 0.0) {
            return Err(RepositoryError::FieldValueError {
                field: "machine_count/cycle_time_s".to_string(),
                message: format!(
                    "机台数量与节拍必须为正: machine_count={}, cycle_time_s={}",
                    input.machine_count, input.cycle_time_s
                ),
            });
        }

        let capacity_per_hour = WorkshopCapacity::derive_capacity_per_hour(input.machine_count, input.cycle_time_s);
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO workshop_capacity
                (workshop, operation_id, machine_name, machine_count, cycle_time_s, capacity_per_hour)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                input.workshop,
                input.operation_id,
                input.machine_name,
                input.machine_count,
                input.cycle_time_s,
                capacity_per_hour
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<WorkshopCapacity>> {
        let conn = self.get_conn()?;
        let capacity = conn
            .query_row(
                r#"
                SELECT id, workshop, operation_id, machine_name, machine_count, cycle_time_s, capacity_per_hour
                FROM workshop_capacity WHERE id = ?1
                "#,
                params![id],
                map_workshop_row,
            )
            .optional()?;
        Ok(capacity)
    }

    /// 查询车间全部机台产能，附带工序名称
    pub fn find_by_workshop(&self, workshop: &str) -> RepositoryResult<Vec<(String, WorkshopCapacity)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT w.id, w.workshop, w.operation_id, w.machine_name, w.machine_count,
                   w.cycle_time_s, w.capacity_per_hour, o.name
            FROM workshop_capacity w
            JOIN operation o ON o.operation_id = w.operation_id
            WHERE w.workshop = ?1
            ORDER BY w.id
            "#,
        )?;
        let rows = stmt.query_map(params![workshop], |row| {
            let capacity = map_workshop_row(row)?;
            let operation_name: String = row.get(7)?;
            Ok((operation_name, capacity))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM workshop_capacity WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "WorkshopCapacity".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn shared_conn() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_shift_capacity_upsert_and_find() {
        let repo = ShiftCapacityRepository::from_connection(shared_conn());
        assert!(repo.find_by_shift(Shift::Day).unwrap().is_none());

        repo.upsert(&ShiftCapacity {
            shift: Shift::Day,
            pieces_per_hour: 100,
            description: Some("day".to_string()),
        })
        .unwrap();
        repo.upsert(&ShiftCapacity {
            shift: Shift::Day,
            pieces_per_hour: 120,
            description: None,
        })
        .unwrap();

        let day = repo.find_by_shift(Shift::Day).unwrap().unwrap();
        assert_eq!(day.pieces_per_hour, 120);
        assert_eq!(repo.list_all().unwrap().len(), 1);
        assert_eq!(repo.delete(Shift::Day).unwrap(), 1);
    }

    #[test]
    fn test_workshop_capacity_join_operation_name() {
        let conn = shared_conn();
        conn.lock()
            .unwrap()
            .execute(
                "INSERT INTO operation (name, default_pieces_per_hour) VALUES ('coat', 40)",
                [],
            )
            .unwrap();
        let repo = WorkshopCapacityRepository::from_connection(conn);

        let id = repo
            .insert(&NewWorkshopCapacity {
                workshop: "W1".to_string(),
                operation_id: 1,
                machine_name: "Coater-1".to_string(),
                machine_count: 2,
                cycle_time_s: 30.0,
            })
            .unwrap();

        let stored = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(stored.capacity_per_hour, 240.0);

        let entries = repo.find_by_workshop("W1").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "coat");
        assert!(repo.find_by_workshop("W2").unwrap().is_empty());
    }

    #[test]
    fn test_workshop_capacity_rejects_bad_cycle_time() {
        let repo = WorkshopCapacityRepository::from_connection(shared_conn());
        let result = repo.insert(&NewWorkshopCapacity {
            workshop: "W1".to_string(),
            operation_id: 1,
            machine_name: "M".to_string(),
            machine_count: 1,
            cycle_time_s: 0.0,
        });
        assert!(matches!(result, Err(RepositoryError::FieldValueError { .. })));
    }

    #[test]
    fn test_delete_missing_workshop_capacity() {
        let repo = WorkshopCapacityRepository::from_connection(shared_conn());
        assert!(matches!(repo.delete(42), Err(RepositoryError::NotFound { .. })));
    }
}
