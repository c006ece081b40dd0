// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use order_scheduler::api::ScheduleApi;
use order_scheduler::domain::{OrderOperationInput, OrderRequest, Shift, ShiftCapacity};
use order_scheduler::logging;
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = order_scheduler::db::open_sqlite_connection(&db_path)?;
    order_scheduler::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库，返回共享连接
pub fn open_shared_conn(db_path: &str) -> Arc<Mutex<Connection>> {
    let conn = order_scheduler::db::open_sqlite_connection(db_path).unwrap();
    Arc::new(Mutex::new(conn))
}

/// 创建带标准工序目录与班次产能的 API
///
/// 目录: cut(默认 1000/h)、coat(无默认)、pack(默认 10/h)
/// 班次产能: DAY=100, NIGHT=60
pub fn seeded_api(db_path: &str) -> ScheduleApi {
    let api = ScheduleApi::from_connection(open_shared_conn(db_path));
    api.register_operation("cut", Some(1000), Some("下料")).unwrap();
    api.register_operation("coat", None, Some("涂布")).unwrap();
    api.register_operation("pack", Some(10), Some("包装")).unwrap();
    api.set_shift_capacity(&ShiftCapacity {
        shift: Shift::Day,
        pieces_per_hour: 100,
        description: Some("白班默认".to_string()),
    })
    .unwrap();
    api.set_shift_capacity(&ShiftCapacity {
        shift: Shift::Night,
        pieces_per_hour: 60,
        description: Some("夜班默认".to_string()),
    })
    .unwrap();
    api
}

/// 2025-01-{day} {hour}:00:00
pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

/// 构造订单请求
pub fn order(quantity: u64, due: NaiveDateTime, operations: &[(&str, Option<i64>)]) -> OrderRequest {
    OrderRequest {
        internal_model: Some("TEST-MODEL".to_string()),
        length_mm: 300.0,
        width_mm: Some(400.0),
        quantity,
        estimated_yield: None,
        due_datetime: due,
        workshop: None,
        operations: operations
            .iter()
            .map(|(name, pph)| OrderOperationInput {
                name: name.to_string(),
                pieces_per_hour: *pph,
            })
            .collect(),
    }
}
