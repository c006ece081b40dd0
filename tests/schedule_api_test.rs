// ==========================================
// ScheduleApi 集成测试
// ==========================================
// 测试目标: 验证订单排程端到端流程（SQLite 临时库）
// 覆盖范围: 目录匹配、产能解析链、配置、校验、导出
// ==========================================

mod test_helpers;

use order_scheduler::api::ApiError;
use order_scheduler::config::SchedulerConfig;
use order_scheduler::engine::{Granularity, ScheduleStrategy};
use order_scheduler::repository::NewWorkshopCapacity;
use test_helpers::{at, create_test_db, order, seeded_api};

#[test]
fn test_schedule_order_uses_catalog_defaults() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);

    // cut 默认 1000/h, pack 默认 10/h
    let report = api
        .schedule_order(&order(100, at(2, 10), &[("cut", None), ("pack", None)]), Some(at(2, 8)), at(2, 7))
        .unwrap();

    assert_eq!(report.schedule.allocated_for("cut"), 100);
    assert_eq!(report.schedule.total_allocated, 10);
    assert!(!report.meets_due());
    // 剩余 90 / 10 每小时 = 9 小时，基准 10:00
    assert_eq!(report.deadline.expected_completion, Some(at(2, 19)));
    assert_eq!(report.remaining, 90);
}

#[test]
fn test_order_override_beats_catalog_default() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);

    let report = api
        .schedule_order(
            &order(100, at(2, 10), &[("cut", None), ("pack", Some(1000))]),
            Some(at(2, 8)),
            at(2, 7),
        )
        .unwrap();
    assert_eq!(report.schedule.total_allocated, 100);
    assert!(report.meets_due());
    assert!(report.schedule.note.is_none());
}

#[test]
fn test_shift_default_applies_without_hint() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);

    // coat 无默认产能 => 班次产能 DAY=100 / NIGHT=60
    let report = api
        .schedule_order(&order(500, at(2, 21), &[("coat", None)]), Some(at(2, 18)), at(2, 7))
        .unwrap();

    let quantities: Vec<u64> = report
        .schedule
        .allocations
        .iter()
        .map(|a| a.allocated_quantity)
        .collect();
    assert_eq!(quantities, vec![100, 60, 60]);
    assert_eq!(report.schedule.total_allocated, 220);
    // coat 无提示，不外推完成时间
    assert_eq!(report.deadline.expected_completion, None);
}

#[test]
fn test_workshop_capacity_beats_shift_default() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);
    let coat_id = api
        .list_operations()
        .unwrap()
        .into_iter()
        .find(|op| op.name == "coat")
        .unwrap()
        .operation_id;

    // 2 台 * 3600 / 72 秒 = 100 件/小时；再加 1 台 * 3600 / 90 = 40
    api.add_workshop_capacity(&NewWorkshopCapacity {
        workshop: "W1".to_string(),
        operation_id: coat_id,
        machine_name: "Coater-A".to_string(),
        machine_count: 2,
        cycle_time_s: 72.0,
    })
    .unwrap();
    api.add_workshop_capacity(&NewWorkshopCapacity {
        workshop: "W1".to_string(),
        operation_id: coat_id,
        machine_name: "Coater-B".to_string(),
        machine_count: 1,
        cycle_time_s: 90.0,
    })
    .unwrap();

    let mut request = order(280, at(2, 22), &[("coat", None)]);
    request.workshop = Some("W1".to_string());
    let report = api.schedule_order(&request, Some(at(2, 20)), at(2, 7)).unwrap();

    assert_eq!(report.schedule.total_allocated, 280);
    assert!(report
        .schedule
        .allocations
        .iter()
        .all(|a| a.allocated_quantity == 140));
}

#[test]
fn test_workshop_capacity_beats_catalog_default() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);
    let cut_id = api
        .list_operations()
        .unwrap()
        .into_iter()
        .find(|op| op.name == "cut")
        .unwrap()
        .operation_id;

    // cut 目录默认 1000/h；车间机台 1 台 * 3600 / 36 秒 = 100/h
    api.add_workshop_capacity(&NewWorkshopCapacity {
        workshop: "W1".to_string(),
        operation_id: cut_id,
        machine_name: "Saw-1".to_string(),
        machine_count: 1,
        cycle_time_s: 36.0,
    })
    .unwrap();

    let mut request = order(500, at(2, 11), &[("cut", None)]);
    request.workshop = Some("W1".to_string());
    let report = api.schedule_order(&request, Some(at(2, 8)), at(2, 7)).unwrap();

    assert_eq!(report.schedule.total_allocated, 300);
    assert!(report
        .schedule
        .allocations
        .iter()
        .all(|a| a.allocated_quantity == 100));
    // 交期外推仍使用目录默认值: 剩余 200 / 1000 => 1 小时
    assert_eq!(report.deadline.expected_completion, Some(at(2, 12)));

    // 订单覆盖仍然优先于车间产能
    let mut overridden = order(500, at(2, 11), &[("cut", Some(250))]);
    overridden.workshop = Some("W1".to_string());
    let report = api.schedule_order(&overridden, Some(at(2, 8)), at(2, 7)).unwrap();
    assert_eq!(report.schedule.total_allocated, 500);
}

#[test]
fn test_missing_operation_is_not_found() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);

    let result = api.schedule_order(&order(10, at(2, 12), &[("weld", None)]), Some(at(2, 8)), at(2, 7));
    match result {
        Err(ApiError::NotFound(msg)) => assert!(msg.contains("weld")),
        other => panic!("Expected NotFound, got {:?}", other.map(|r| r.schedule.total_allocated)),
    }
}

#[test]
fn test_duplicate_operation_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);

    let result = api.schedule_order(
        &order(10, at(2, 12), &[("cut", None), ("cut", None)]),
        Some(at(2, 8)),
        at(2, 7),
    );
    assert!(matches!(result, Err(ApiError::DuplicateOperation(_))));

    assert!(matches!(
        api.register_operation("cut", None, None),
        Err(ApiError::DuplicateOperation(_))
    ));
    match api.register_operation("  pack ", Some(5), None) {
        Err(ApiError::DuplicateOperation(name)) => assert_eq!(name, "pack"),
        other => panic!("Expected DuplicateOperation, got {:?}", other),
    }
    assert_eq!(api.list_operations().unwrap().len(), 3);
}

#[test]
fn test_window_cap_from_config() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);
    api.save_scheduler_config(&SchedulerConfig {
        max_window_hours: 24,
        ..SchedulerConfig::default()
    })
    .unwrap();

    let result = api.schedule_order(&order(10, at(4, 8), &[("cut", None)]), Some(at(2, 8)), at(2, 7));
    match result {
        Err(ApiError::WindowTooLarge { hours, max }) => {
            assert_eq!(hours, 48);
            assert_eq!(max, 24);
        }
        other => panic!("Expected WindowTooLarge, got {:?}", other.is_ok()),
    }
}

#[test]
fn test_default_window_cap_rejects_long_orders() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);
    let max = SchedulerConfig::default().max_window_hours;

    // 起点 2025-01-02 08:30 向下取整到 08:00，窗口 max + 1 小时
    let start = at(2, 8) + chrono::Duration::minutes(30);
    let due = at(2, 8) + chrono::Duration::hours(max + 1);
    match api.schedule_order(&order(10, due, &[("cut", None)]), Some(start), at(2, 7)) {
        Err(ApiError::WindowTooLarge { hours, max: limit }) => {
            assert_eq!(hours, max + 1);
            assert_eq!(limit, max);
        }
        other => panic!("Expected WindowTooLarge, got {:?}", other.is_ok()),
    }

    let due = at(2, 8) + chrono::Duration::hours(max);
    assert!(api
        .schedule_order(&order(10, due, &[("cut", None)]), Some(start), at(2, 7))
        .is_ok());
}

#[test]
fn test_extreme_quantities_still_produce_a_report() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);

    let huge = api
        .schedule_order(&order(u64::MAX, at(2, 10), &[("pack", None)]), Some(at(2, 8)), at(2, 7))
        .unwrap();
    assert_eq!(huge.required_input, u64::MAX);
    assert_eq!(huge.schedule.total_allocated, 20);
    assert!(!huge.meets_due());
    assert_eq!(huge.deadline.expected_completion, None);
    assert!(!huge.deadline.meets_due_estimate);

    let mut tiny_yield = order(1000, at(2, 9), &[("pack", None)]);
    tiny_yield.estimated_yield = Some(1e-9);
    let report = api.schedule_order(&tiny_yield, Some(at(2, 8)), at(2, 7)).unwrap();
    assert!(report.required_input > 1000);
    assert_eq!(report.schedule.total_allocated, 10);
    assert_eq!(report.deadline.expected_completion, None);
    assert!(!report.deadline.meets_due_estimate);
    assert!(api.export_json(&report).is_ok());
}

#[test]
fn test_default_start_is_next_hour() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);
    let now = at(2, 8) + chrono::Duration::minutes(25);

    let report = api
        .schedule_order(&order(10, at(2, 12), &[("cut", None)]), None, now)
        .unwrap();
    assert_eq!(report.schedule.allocations[0].hour_start, at(2, 9));
}

#[test]
fn test_configured_strategy_and_override() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);
    api.save_scheduler_config(&SchedulerConfig {
        strategy: ScheduleStrategy::BackwardPerOperation,
        ..SchedulerConfig::default()
    })
    .unwrap();

    let request = order(10, at(2, 18), &[("cut", None), ("pack", None)]);
    let backward = api.schedule_order(&request, Some(at(2, 8)), at(2, 7)).unwrap();
    assert_eq!(backward.strategy, ScheduleStrategy::BackwardPerOperation);
    assert_eq!(backward.schedule.last_hour_end_for("pack"), Some(at(2, 18)));

    let forward = api
        .schedule_order_with_strategy(&request, Some(at(2, 8)), at(2, 7), Some(ScheduleStrategy::ForwardPipeline))
        .unwrap();
    assert_eq!(forward.strategy, ScheduleStrategy::ForwardPipeline);
    assert_eq!(forward.schedule.last_hour_end_for("pack"), Some(at(2, 10)));
}

#[test]
fn test_yield_raises_required_input() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);

    let mut request = order(500, at(2, 12), &[("cut", None)]);
    request.estimated_yield = Some(98.5);
    let report = api.schedule_order(&request, Some(at(2, 8)), at(2, 7)).unwrap();

    assert_eq!(report.required_input, 508);
    assert_eq!(report.schedule.total_allocated, 508);
    assert_eq!(report.allocated_pct, 100.0);
}

#[test]
fn test_exports_and_summary() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = seeded_api(&db_path);

    // coat 跨越白班/夜班：18:00-21:00
    let report = api
        .schedule_order(&order(220, at(2, 21), &[("coat", None)]), Some(at(2, 18)), at(2, 7))
        .unwrap();

    let csv = api.export_csv(&report).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "start,end,shift,operation,allocated");
    assert_eq!(lines[1], "2025-01-02 18:00,2025-01-02 19:00,DAY,coat,100");
    assert_eq!(lines[2], "2025-01-02 19:00,2025-01-02 20:00,NIGHT,coat,60");

    let localized = api.export_localized_csv(&report, "zh-CN").unwrap();
    assert!(localized.starts_with("工序,班次,开始时间,结束时间,分配数量"));
    assert!(localized.contains("coat,夜班,"));

    let json = api.export_json(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["schedule"]["total_allocated"], 220);

    let by_shift = api.summarize(&report, Granularity::Shift).unwrap();
    assert_eq!(by_shift.len(), 2);
    assert_eq!(by_shift[0].allocated, 100);
    assert_eq!(by_shift[1].allocated, 120);

    let by_day = api.summarize(&report, Granularity::Day).unwrap();
    assert_eq!(by_day.len(), 1);
    assert_eq!(by_day[0].hours, 3);
}

#[test]
fn test_reopen_database_keeps_catalog() {
    let (_tmp, db_path) = create_test_db().unwrap();
    {
        let api = seeded_api(&db_path);
        assert_eq!(api.list_operations().unwrap().len(), 3);
    }

    let reopened = order_scheduler::api::ScheduleApi::open(&db_path).unwrap();
    assert_eq!(reopened.list_operations().unwrap().len(), 3);
    assert_eq!(reopened.scheduler_config().unwrap(), SchedulerConfig::default());
}
