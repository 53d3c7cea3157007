// ==========================================
// 针织车间停机统计系统 - 命令行入口
// ==========================================
// 用法:
//   knit-downtime overview <yyyy-MM-dd> <day|night>
//   knit-downtime machine-card|fault-log|fault-report <机台号> <yyyy-MM-dd> <day|night>
//   knit-downtime dashboard <yyyy-MM-dd> <day|night>
//   knit-downtime input-fault "<dd/MM/yyyy HH:mm:ss;码;描述;工号;姓名;H:MM:SS;机台>"
//   knit-downtime remove-fault "<yyyy-MM-dd HH:mm:ss>" <机台号>
//   knit-downtime input-warping|input-production "<原始行>"
//   knit-downtime machines | operators | fault-codes
// 配置: KNIT_DOWNTIME_DB_PATH / KNIT_DOWNTIME_FAULT_LOG_DIR / KNIT_DOWNTIME_MACHINES
// 输出: stdout 为 JSON, 日志走 stderr
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use knit_downtime::api::ReportApi;
use knit_downtime::app::AppState;
use knit_downtime::config::FactoryConfig;
use knit_downtime::logging;
use serde::Serialize;
use std::sync::Arc;

const USAGE: &str = "usage: knit-downtime <overview|machine-card|fault-log|fault-report|dashboard|input-fault|remove-fault|input-warping|input-production|machines|operators|fault-codes> [args]";

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).ok_or_else(|| anyhow!(USAGE))?;

    let config = FactoryConfig::from_env().map_err(|e| anyhow!("配置加载失败: {}", e))?;
    tracing::info!("{} v{}", knit_downtime::APP_NAME, knit_downtime::VERSION);
    let state = AppState::new(config).map_err(|e| anyhow!(e))?;

    match (command, &args[1..]) {
        ("overview", [date, shift]) => print_json(&state.report_api.overview(date, shift)),
        ("machine-card", [machine, date, shift]) => {
            print_json(&state.report_api.machine_card(parse_machine(machine)?, date, shift))
        }
        ("fault-log", [machine, date, shift]) => {
            print_json(&state.report_api.fault_log(parse_machine(machine)?, date, shift))
        }
        ("fault-report", [machine, date, shift]) => {
            print_json(&state.report_api.fault_report(parse_machine(machine)?, date, shift))
        }
        ("dashboard", [date, shift]) => {
            let machines = state.floor_api.machine_numbers();
            let report = ReportApi::dashboard(Arc::clone(&state.report_api), date, shift, &machines).await;
            print_json(&report)
        }
        ("input-fault", [line]) => {
            let id = state
                .floor_api
                .input_fault_log(line)
                .map_err(|e| anyhow!("{}: {}", e.user_message(), e))?;
            print_json(&serde_json::json!({ "id": id }))
        }
        ("remove-fault", [timestamp, machine]) => {
            let hidden = state
                .floor_api
                .remove_fault(timestamp, parse_machine(machine)?)
                .map_err(|e| anyhow!("{}: {}", e.user_message(), e))?;
            print_json(&serde_json::json!({ "removed": hidden }))
        }
        ("input-warping", [line]) => {
            state.floor_api.input_warping_fault_log(line);
            Ok(())
        }
        ("input-production", [line]) => {
            state.floor_api.input_knitting_production_log(line);
            Ok(())
        }
        ("machines", []) => print_json(&state.floor_api.machine_numbers()),
        ("operators", []) => {
            let operators = state
                .floor_api
                .operators()
                .map_err(|e| anyhow!("{}: {}", e.user_message(), e))?;
            print_json(&operators)
        }
        ("fault-codes", []) => {
            let codes = state
                .floor_api
                .fault_codes()
                .map_err(|e| anyhow!("{}: {}", e.user_message(), e))?;
            print_json(&codes)
        }
        _ => bail!(USAGE),
    }
}

fn parse_machine(raw: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .with_context(|| format!("无效机台号: {:?}", raw))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
