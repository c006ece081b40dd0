// ==========================================
// 订单工序排程系统 - 导出层
// ==========================================
// 职责: 将排程结果渲染为 CSV / JSON
// ==========================================

pub mod csv_export;
pub mod error;
pub mod json_export;

pub use csv_export::{
    allocations_to_csv, allocations_to_localized_csv, buckets_to_csv, write_allocations_csv,
    CSV_HEADER, CSV_TIME_FORMAT,
};
pub use error::{ExportError, ExportResult};
pub use json_export::{allocations_to_json, report_to_json};
