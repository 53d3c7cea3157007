// ==========================================
// 应用装配测试
// ==========================================
// 测试目标: 配置覆写 / 事件源选择（日志文件 vs 故障库）
// ==========================================


use knit_downtime::app::AppState;
use knit_downtime::config::{config_keys, ConfigManager, FactoryConfig};
use std::fs;
use tempfile::TempDir;
use test_helpers::create_test_db;

const HEADER: &str = "Date;Code;Fault;Operator No;Operator;Fault Time;Machine";

fn write_fault_log(dir: &TempDir, file_name: &str, lines: &[&str]) {
    let mut text = String::from("sep=;\n");
    text.push_str(HEADER);
    for line in lines {
        text.push('\n');
        text.push_str(line);
    }
    fs::write(dir.path().join(file_name), text).unwrap();
}

#[test]
fn test_config_overrides_machine_list() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();
    manager
        .set_global_config_value(config_keys::MACHINE_NUMBERS, "[3, 17]")
        .unwrap();

    let state = AppState::new(FactoryConfig::new(db_path.clone())).unwrap();
    assert_eq!(state.config.machine_numbers, vec![3, 17]);
    assert_eq!(state.floor_api.machine_numbers(), vec![3, 17]);
}

#[test]
fn test_malformed_override_keeps_defaults() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();
    manager
        .set_global_config_value(config_keys::MACHINE_NUMBERS, "three, seventeen")
        .unwrap();

    let config = FactoryConfig::new(db_path.clone()).with_machine_numbers(vec![1, 2]);
    let state = AppState::new(config).unwrap();
    assert_eq!(state.config.machine_numbers, vec![1, 2]);
}

#[test]
fn test_fault_log_dir_switches_to_file_source() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let log_dir = TempDir::new().unwrap();
    write_fault_log(
        &log_dir,
        "4.7.2024 All Machines Knitting MCs Fault Log.csv",
        &[
            "04/07/2024 07:00:00;12;Standing;305;J. Smith;0:30:00;3",
            "04/07/2024 08:00:00;40;Needle Break;306;A. Jones;0:39:00;3",
            "garbage row",
            ";12;Standing;305;J. Smith;0:15:00;3",
            "04/07/2024 19:00:00;12;Standing;305;J. Smith;0:05:00;3",
        ],
    );

    let config = FactoryConfig::new(db_path).with_fault_log_dir(log_dir.path());
    let state = AppState::new(config).unwrap();

    // 坏行跳过; 无时间戳的行归属当日白班,排在最后
    let log = state.report_api.fault_log(3, "2024-07-04", "day").report.unwrap();
    let rows: Vec<(&str, &str)> = log
        .fault_log
        .iter()
        .map(|r| (r.date.as_str(), r.fault_time.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("2024-07-04 07:00:00", "00:30:00"),
            ("2024-07-04 08:00:00", "00:39:00"),
            ("", "00:15:00"),
        ]
    );

    // 3 号机白班停机 1:24:00 = 1.4h,开机率 (11.5 - 1.4) / 11.5
    let overview = state.report_api.overview("2024-07-04", "day").report.unwrap();
    assert_eq!(overview.percent_for(3), Some(87.8));

    let report = state.report_api.fault_report(3, "2024-07-04", "day").report.unwrap();
    assert_eq!(report.total_down_time, 1.4);
    assert_eq!(report.row("Standing").unwrap().count, 2);
}

#[test]
fn test_missing_log_file_means_no_faults() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let log_dir = TempDir::new().unwrap();

    let config = FactoryConfig::new(db_path).with_fault_log_dir(log_dir.path());
    let state = AppState::new(config).unwrap();

    let resp = state.report_api.overview("2024-07-04", "day");
    assert!(resp.is_ok());
    assert!(resp.report.unwrap().machines.numbers.is_empty());
}
