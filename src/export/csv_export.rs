// ==========================================
// 订单工序排程系统 - CSV 导出
// ==========================================
// 标准格式: start,end,shift,operation,allocated（与既有消费方兼容）
// 本地化格式: 工序,班次,开始时间,结束时间,分配数量（表头与班次名称随语言切换）
// 时间格式: %Y-%m-%d %H:%M
// ==========================================

use crate::domain::schedule::Allocation;
use crate::engine::aggregate::{AllocationBucket, Granularity};
use crate::export::error::{ExportError, ExportResult};
use crate::i18n;
use std::io::Write;

/// CSV 时间格式
pub const CSV_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// 标准 CSV 表头
pub const CSV_HEADER: [&str; 5] = ["start", "end", "shift", "operation", "allocated"];

/// 将分配记录写入任意输出（标准格式）
pub fn write_allocations_csv<W: Write>(writer: W, allocations: &[Allocation]) -> ExportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for alloc in allocations {
        wtr.write_record([
            alloc.hour_start.format(CSV_TIME_FORMAT).to_string(),
            alloc.hour_end.format(CSV_TIME_FORMAT).to_string(),
            alloc.shift.as_str().to_string(),
            alloc.operation_name.clone(),
            alloc.allocated_quantity.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// 标准格式 CSV 文本
pub fn allocations_to_csv(allocations: &[Allocation]) -> ExportResult<String> {
    let mut buf = Vec::new();
    write_allocations_csv(&mut buf, allocations)?;
    Ok(String::from_utf8(buf)?)
}

/// 本地化 CSV 文本
///
/// # 参数
/// - locale: 语言代码（"zh-CN" 或 "en"）
pub fn allocations_to_localized_csv(allocations: &[Allocation], locale: &str) -> ExportResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([
        i18n::t_in(locale, "csv.operation"),
        i18n::t_in(locale, "csv.shift"),
        i18n::t_in(locale, "csv.start"),
        i18n::t_in(locale, "csv.end"),
        i18n::t_in(locale, "csv.allocated"),
    ])?;

    for alloc in allocations {
        wtr.write_record([
            alloc.operation_name.clone(),
            i18n::t_in(locale, alloc.shift.i18n_key()),
            alloc.hour_start.format(CSV_TIME_FORMAT).to_string(),
            alloc.hour_end.format(CSV_TIME_FORMAT).to_string(),
            alloc.allocated_quantity.to_string(),
        ])?;
    }

    into_string(wtr)
}

/// 汇总表 CSV: period,operation,allocated,hours
pub fn buckets_to_csv(buckets: &[AllocationBucket], granularity: Granularity) -> ExportResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["period", "operation", "allocated", "hours"])?;
    for bucket in buckets {
        wtr.write_record([
            bucket.label(granularity),
            bucket.operation_name.clone(),
            bucket.allocated.to_string(),
            bucket.hours.to_string(),
        ])?;
    }
    into_string(wtr)
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> ExportResult<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| ExportError::IoError(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::Shift;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn sample() -> Vec<Allocation> {
        vec![
            Allocation {
                hour_start: at(8),
                hour_end: at(8) + Duration::hours(1),
                shift: Shift::Day,
                operation_name: "cut".to_string(),
                allocated_quantity: 100,
            },
            Allocation {
                hour_start: at(20),
                hour_end: at(21),
                shift: Shift::Night,
                operation_name: "pack".to_string(),
                allocated_quantity: 10,
            },
        ]
    }

    #[test]
    fn test_standard_csv_layout() {
        let text = allocations_to_csv(&sample()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "start,end,shift,operation,allocated");
        assert_eq!(lines[1], "2025-01-02 08:00,2025-01-02 09:00,DAY,cut,100");
        assert_eq!(lines[2], "2025-01-02 20:00,2025-01-02 21:00,NIGHT,pack,10");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_allocations_header_only() {
        let text = allocations_to_csv(&[]).unwrap();
        assert_eq!(text.trim_end(), "start,end,shift,operation,allocated");
    }

    #[test]
    fn test_localized_csv_zh() {
        let text = allocations_to_localized_csv(&sample(), "zh-CN").unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "工序,班次,开始时间,结束时间,分配数量");
        assert_eq!(lines[1], "cut,白班,2025-01-02 08:00,2025-01-02 09:00,100");
        assert!(lines[2].starts_with("pack,夜班,"));
    }

    #[test]
    fn test_localized_csv_en() {
        let text = allocations_to_localized_csv(&sample(), "en").unwrap();
        let first = text.lines().next().unwrap();
        assert_eq!(first, "Operation,Shift,Start,End,Allocated");
        assert!(text.contains(",Day,"));
    }
}
