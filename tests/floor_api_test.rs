// ==========================================
// 车间状态 API 集成测试
// ==========================================
// 测试目标: 故障录入校验 / 责任挡车工 / 纠正措施 / 直线纱
// ==========================================


use knit_downtime::api::ApiError;
use knit_downtime::domain::{CorrectiveActionInput, UNASSIGNED};
use test_helpers::{create_test_db, feed_line, seed_codes, sqlite_apis, TEST_MACHINES};

fn action(fault: &str, observation: &str, action: &str) -> CorrectiveActionInput {
    CorrectiveActionInput {
        fault: fault.to_string(),
        observation: observation.to_string(),
        action: action.to_string(),
    }
}

// ==========================================
// 故障录入
// ==========================================

#[test]
fn test_input_fault_log_registers_roster() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (_report_api, floor_api) = sqlite_apis(&db_path, "2024-07-05 09:00:00");

    let id = floor_api
        .input_fault_log(&feed_line("04/07/2024 07:15:30", 12, "Standing", (305, "J. Smith"), "0:04:10", 17))
        .unwrap();
    assert!(id > 0);

    assert_eq!(floor_api.operator_name(305).unwrap(), "J. Smith");
    assert_eq!(floor_api.operators().unwrap().len(), 1);
}

#[test]
fn test_malformed_fault_lines_are_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (report_api, floor_api) = sqlite_apis(&db_path, "2024-07-05 09:00:00");

    let bad_lines = [
        "2024-07-04 07:15:30;12;Standing;305;J. Smith;0:04:10;17", // 日期格式
        "04/07/2024 07:15:30;x;Standing;305;J. Smith;0:04:10;17",  // 故障码
        "04/07/2024 07:15:30;12;Standing;305;J. Smith;0:61:10;17", // 时长
        "04/07/2024 07:15:30;12;Standing;305;J. Smith;0:04:10;0",  // 机台号
        "04/07/2024 07:15:30;12;Standing;305;J. Smith;9999999999999999:00:00;17", // 时长溢出
        "04/07/2024 07:15:30;12;Standing",                         // 列数不足
    ];
    for line in bad_lines {
        let err = floor_api.input_fault_log(line).unwrap_err();
        assert!(matches!(err, ApiError::MalformedRecord(_)), "line {:?} gave {:?}", line, err);
        assert_eq!(err.user_message(), "Malformed record");
    }

    // 拒绝的行不得落库
    let log = report_api.fault_log(17, "2024-07-04", "day").report.unwrap();
    assert!(log.fault_log.is_empty());
}

#[test]
fn test_remove_fault_rejects_bad_timestamp() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (_report_api, floor_api) = sqlite_apis(&db_path, "2024-07-05 09:00:00");

    let err = floor_api.remove_fault("04/07/2024 07:15:30", 3).unwrap_err();
    assert!(matches!(err, ApiError::InvalidDateFormat(_)));
}

// ==========================================
// 责任挡车工
// ==========================================

#[test]
fn test_accountable_knitter_defaults_to_unassigned() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (_report_api, floor_api) = sqlite_apis(&db_path, "2024-07-05 09:00:00");

    let assigned = floor_api
        .check_accountable_knitter("2024-07-04", "day", &TEST_MACHINES)
        .unwrap();
    assert_eq!(assigned.len(), TEST_MACHINES.len());
    assert!(assigned.values().all(|name| name == UNASSIGNED));
}

#[test]
fn test_accountable_knitter_overwrites_per_shift() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (_report_api, floor_api) = sqlite_apis(&db_path, "2024-07-05 09:00:00");
    seed_codes(&floor_api);

    assert_eq!(floor_api.set_accountable_knitter(305, "2024-07-04", "day", &[3, 17]).unwrap(), 2);
    // 覆盖 17 号机
    floor_api.set_accountable_knitter(306, "2024-07-04", "day", &[17]).unwrap();

    let day = floor_api
        .check_accountable_knitter("2024-07-04", "day", &TEST_MACHINES)
        .unwrap();
    assert_eq!(day[&3], "J. Smith");
    assert_eq!(day[&17], "A. Jones");
    assert_eq!(day[&26], UNASSIGNED);

    // 夜班互不影响
    let night = floor_api
        .check_accountable_knitter("2024-07-04", "night", &[3])
        .unwrap();
    assert_eq!(night[&3], UNASSIGNED);
}

#[test]
fn test_accountable_knitter_validates_input() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (_report_api, floor_api) = sqlite_apis(&db_path, "2024-07-05 09:00:00");

    assert!(matches!(
        floor_api.set_accountable_knitter(305, "2024-07-04", "day", &[]),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        floor_api.set_accountable_knitter(305, "2024-07-04", "late", &[3]),
        Err(ApiError::InvalidShiftLabel(_))
    ));
    assert!(matches!(
        floor_api.check_accountable_knitter("4 July", "day", &[3]),
        Err(ApiError::InvalidDateFormat(_))
    ));
}

// ==========================================
// 纠正措施
// ==========================================

#[test]
fn test_corrective_action_lifecycle() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (_report_api, floor_api) = sqlite_apis(&db_path, "2024-07-05 09:00:00");
    seed_codes(&floor_api);

    let written = floor_api
        .save_corrective_actions(
            "2024-07-04",
            3,
            true,
            &[
                action("Standing", "Yarn carrier stuck", "Cleaned carrier"),
                action("Needle Break", "Worn needles", "Replaced bed"),
            ],
        )
        .unwrap();
    assert_eq!(written, 2);

    // 同键再次保存覆盖原内容
    floor_api
        .save_corrective_actions("2024-07-04", 3, true, &[action("Standing", "Carrier stuck again", "Re-aligned")])
        .unwrap();

    let open = floor_api
        .get_corrective_action("2024-07-04", 3, true, "Standing")
        .unwrap();
    assert_eq!(open.observation, "Carrier stuck again");
    assert_eq!(open.action, "Re-aligned");

    let list = floor_api.action_list().unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.iter().all(|item| item.date == "04/07/2024" && item.isdayshift));

    floor_api.complete_action(open.id, "2024-07-05 10:00:00").unwrap();
    assert_eq!(floor_api.action_list().unwrap().len(), 1);

    let err = floor_api
        .get_corrective_action("2024-07-04", 3, true, "Standing")
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[test]
fn test_corrective_action_unknown_fault_rolls_back_batch() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (_report_api, floor_api) = sqlite_apis(&db_path, "2024-07-05 09:00:00");
    seed_codes(&floor_api);

    let err = floor_api
        .save_corrective_actions(
            "2024-07-04",
            3,
            false,
            &[
                action("Standing", "ok", "ok"),
                action("Cosmic Rays", "??", "??"),
            ],
        )
        .unwrap_err();
    assert_eq!(err.user_message(), "Fault code not found");
    assert!(floor_api.action_list().unwrap().is_empty());

    let err = floor_api
        .get_corrective_action("2024-07-04", 3, false, "Cosmic Rays")
        .unwrap_err();
    assert_eq!(err.user_message(), "Fault code not found");
}

#[test]
fn test_complete_unknown_action_is_not_found() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (_report_api, floor_api) = sqlite_apis(&db_path, "2024-07-05 09:00:00");

    let err = floor_api.complete_action(999, "2024-07-05 10:00:00").unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

// ==========================================
// 直线纱
// ==========================================

#[test]
fn test_linear_thread_flag() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (_report_api, floor_api) = sqlite_apis(&db_path, "2024-07-05 09:00:00");

    assert!(!floor_api.get_linear_thread("2024-07-04", 3, true).unwrap());

    floor_api.set_linear_thread("2024-07-04", 3, true, true).unwrap();
    assert!(floor_api.get_linear_thread("2024-07-04", 3, true).unwrap());
    assert!(!floor_api.get_linear_thread("2024-07-04", 3, false).unwrap());

    floor_api.set_linear_thread("2024-07-04", 3, true, false).unwrap();
    assert!(!floor_api.get_linear_thread("2024-07-04", 3, true).unwrap());
}
