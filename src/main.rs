// ==========================================
// 订单工序排程系统 - 命令行入口
// ==========================================
// 用法:
//   order-scheduler <request.json> [--db <path>] [--csv] [--locale <code>]
//                   [--strategy <name>] [--summary <hour|shift|day>]
//
// 未指定 --db 时使用内存数据库，工序目录与班次产能取自请求文件
// ==========================================

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDateTime;
use order_scheduler::api::ScheduleApi;
use order_scheduler::domain::{OrderRequest, ShiftCapacity};
use order_scheduler::engine::{Granularity, ScheduleStrategy};
use order_scheduler::{export, i18n, logging};
use rusqlite::Connection;
use serde::Deserialize;
use std::sync::{Arc, Mutex};

/// 请求文件中的工序目录条目
#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
    #[serde(default)]
    default_pieces_per_hour: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

/// 请求文件
#[derive(Debug, Deserialize)]
struct PlanFile {
    order: OrderRequest,
    #[serde(default)]
    start: Option<NaiveDateTime>,
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
    #[serde(default)]
    shift_capacities: Vec<ShiftCapacity>,
}

#[derive(Debug, Default)]
struct CliArgs {
    request_path: String,
    db_path: Option<String>,
    csv: bool,
    locale: Option<String>,
    strategy: Option<ScheduleStrategy>,
    summary: Option<Granularity>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" => cli.db_path = Some(args.next().ok_or_else(|| anyhow!("--db 需要路径参数"))?),
            "--csv" => cli.csv = true,
            "--locale" => cli.locale = Some(args.next().ok_or_else(|| anyhow!("--locale 需要语言参数"))?),
            "--strategy" => {
                let raw = args.next().ok_or_else(|| anyhow!("--strategy 需要策略参数"))?;
                cli.strategy = Some(raw.parse().map_err(|e: String| anyhow!(e))?);
            }
            "--summary" => {
                let raw = args.next().ok_or_else(|| anyhow!("--summary 需要粒度参数"))?;
                cli.summary = Some(raw.parse().map_err(|e: String| anyhow!(e))?);
            }
            other if other.starts_with("--") => bail!("未知参数: {}", other),
            other => {
                if !cli.request_path.is_empty() {
                    bail!("只能指定一个请求文件");
                }
                cli.request_path = other.to_string();
            }
        }
    }
    if cli.request_path.is_empty() {
        bail!("用法: order-scheduler <request.json> [--db <path>] [--csv] [--locale <code>] [--strategy <name>] [--summary <hour|shift|day>]");
    }
    Ok(cli)
}

fn open_api(cli: &CliArgs, plan: &PlanFile) -> anyhow::Result<ScheduleApi> {
    let api = match &cli.db_path {
        Some(path) => ScheduleApi::open(path)?,
        None => {
            let conn = Connection::open_in_memory()?;
            order_scheduler::db::configure_sqlite_connection(&conn)?;
            order_scheduler::db::init_schema(&conn)?;
            ScheduleApi::from_connection(Arc::new(Mutex::new(conn)))
        }
    };

    let known: Vec<String> = api.list_operations()?.into_iter().map(|op| op.name).collect();
    for entry in &plan.catalog {
        if !known.contains(&entry.name) {
            api.register_operation(&entry.name, entry.default_pieces_per_hour, entry.description.as_deref())?;
        }
    }
    // 内存库模式下，订单中未列入目录的工序自动登记（无默认产能）
    if cli.db_path.is_none() {
        for op in &plan.order.operations {
            let listed = plan.catalog.iter().any(|c| c.name == op.name);
            if !listed && !known.contains(&op.name) {
                api.register_operation(&op.name, None, None)?;
            }
        }
    }
    for capacity in &plan.shift_capacities {
        api.set_shift_capacity(capacity)?;
    }
    Ok(api)
}

fn main() -> anyhow::Result<()> {
    // LOG_FORMAT=json 时输出结构化日志
    if std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false) {
        logging::init_json();
    } else {
        logging::init();
    }

    let cli = parse_args(std::env::args().skip(1))?;
    if let Some(locale) = &cli.locale {
        i18n::set_locale(locale);
    }

    let raw = std::fs::read_to_string(&cli.request_path)
        .with_context(|| format!("无法读取请求文件: {}", cli.request_path))?;
    let plan: PlanFile = serde_json::from_str(&raw).context("请求文件格式错误")?;

    tracing::info!(version = order_scheduler::VERSION, "{}", order_scheduler::APP_NAME);

    let api = open_api(&cli, &plan)?;
    let now = chrono::Local::now().naive_local();
    let report = api.schedule_order_with_strategy(&plan.order, plan.start, now, cli.strategy)?;

    if let Some(granularity) = cli.summary {
        let buckets = api.summarize(&report, granularity)?;
        print!("{}", export::buckets_to_csv(&buckets, granularity)?);
    } else if cli.csv {
        let text = match &cli.locale {
            Some(locale) => api.export_localized_csv(&report, locale)?,
            None => api.export_csv(&report)?,
        };
        print!("{}", text);
    } else {
        println!("{}", api.export_json(&report)?);
    }

    let verdict = if report.meets_due() {
        i18n::t("schedule.meets_due")
    } else {
        i18n::t("schedule.misses_due")
    };
    eprintln!("{}", verdict);
    if let Some(expected) = report.deadline.expected_completion {
        let time = expected.format("%Y-%m-%d %H:%M").to_string();
        eprintln!(
            "{}",
            i18n::t_with_args("schedule.expected_completion", &[("time", time.as_str())])
        );
    }
    if !report.meets_due() {
        if let Some(last) = plan.order.operations.last() {
            let requested = report.required_input.to_string();
            let allocated = report.schedule.total_allocated.to_string();
            eprintln!(
                "{}",
                i18n::t_with_args(
                    "schedule.under_capacity",
                    &[
                        ("operation", last.name.as_str()),
                        ("requested", requested.as_str()),
                        ("allocated", allocated.as_str()),
                    ]
                )
            );
        }
    }
    Ok(())
}
