mod support;

use std::thread;

use ledger_app::AppError;
use ledger_core::RecordDay;
use ledger_db::IncrementOutcome;
use support::{TODAY, report, setup_app, setup_app_with};

#[test]
fn records_example_session() {
    let app = setup_app();
    let usage = &app.state.services.usage;

    let ack = usage
        .record_session(&report(3, "2024-01-01 10:00", "2024-01-01 10:30", 30))
        .expect("record session");

    assert_eq!(ack.date, TODAY);
    assert_eq!(ack.table, 3);
    assert_eq!(ack.seconds_added, 1800);
    assert_eq!(ack.outcome, IncrementOutcome::DayCreated);
    assert_eq!(ack.message(), "Updated table_3 with 1800 seconds");

    let record = usage.usage_record(TODAY).expect("read").expect("record");
    assert_eq!(record.tables.len(), 7);
    for table in 1..=7 {
        let expected = if table == 3 { 1800 } else { 0 };
        assert_eq!(record.total_time(table), Some(expected));
    }
}

#[test]
fn same_day_sessions_accumulate() {
    let app = setup_app();
    let usage = &app.state.services.usage;

    usage
        .record_session(&report(5, "2024-01-01 10:00", "2024-01-01 10:45", 45))
        .expect("first");
    let ack = usage
        .record_session(&report(5, "2024-01-01 12:00", "2024-01-01 12:20", 20))
        .expect("second");
    assert_eq!(ack.outcome, IncrementOutcome::Incremented);

    let record = usage.usage_record(TODAY).expect("read").expect("record");
    assert_eq!(record.total_time(5), Some((45 + 20) * 60));
}

#[test]
fn server_clock_decides_the_day_by_default() {
    let app = setup_app();
    let usage = &app.state.services.usage;

    let ack = usage
        .record_session(&report(1, "2023-06-15 10:00", "2023-06-15 11:00", 60))
        .expect("record");
    assert_eq!(ack.date, TODAY);
    assert!(usage.usage_record("2023-06-15").expect("read").is_none());
}

#[test]
fn session_start_policy_books_under_start_date() {
    let app = setup_app_with(|config| config.record_day = RecordDay::SessionStart);
    let usage = &app.state.services.usage;

    let ack = usage
        .record_session(&report(1, "2023-06-15 23:50", "2023-06-16 00:20", 30))
        .expect("record");
    assert_eq!(ack.date, "2023-06-15");
    let record = usage
        .usage_record("2023-06-15")
        .expect("read")
        .expect("record");
    assert_eq!(record.total_time(1), Some(1800));
}

#[test]
fn out_of_range_tables_are_rejected_without_writing() {
    let app = setup_app();
    let usage = &app.state.services.usage;

    for table in [0, 8] {
        let err = usage
            .record_session(&report(table, "2024-01-01 10:00", "2024-01-01 10:30", 30))
            .expect_err("out of range");
        match err {
            AppError::InvalidInput(detail) => assert!(detail.contains("table id out of range")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
    assert!(usage.usage_record(TODAY).expect("read").is_none());
}

#[test]
fn configured_table_count_widens_range() {
    let app = setup_app_with(|config| config.table_count = 10);
    let usage = &app.state.services.usage;

    usage
        .record_session(&report(10, "2024-01-01 10:00", "2024-01-01 10:10", 10))
        .expect("table 10");
    let record = usage.usage_record(TODAY).expect("read").expect("record");
    assert_eq!(record.tables.len(), 10);
    assert_eq!(record.total_time(10), Some(600));

    let err = usage
        .record_session(&report(11, "2024-01-01 10:00", "2024-01-01 10:10", 10))
        .expect_err("table 11");
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[test]
fn non_positive_durations_are_rejected() {
    let app = setup_app();
    let usage = &app.state.services.usage;

    for minutes in [0, -10] {
        let err = usage
            .record_session(&report(2, "2024-01-01 10:00", "2024-01-01 10:00", minutes))
            .expect_err("non-positive");
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
    assert!(usage.usage_record(TODAY).expect("read").is_none());
}

#[test]
fn unparseable_timestamps_are_rejected() {
    let app = setup_app();
    let usage = &app.state.services.usage;

    let err = usage
        .record_session(&report(2, "01/01/2024 10:00", "2024-01-01 10:30", 30))
        .expect_err("bad start");
    match err {
        AppError::InvalidInput(detail) => assert!(detail.contains("unparseable timestamp")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn mismatched_or_reversed_sessions_are_rejected_without_writing() {
    let app = setup_app();
    let usage = &app.state.services.usage;

    let err = usage
        .record_session(&report(4, "2024-01-01 10:00", "2024-01-01 10:15", 10))
        .expect_err("mismatch");
    match err {
        AppError::DurationMismatch(detail) => {
            assert!(detail.contains("reported 10"));
            assert!(detail.contains("calculated 15"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = usage
        .record_session(&report(4, "2024-01-01 10:30", "2024-01-01 10:00", 30))
        .expect_err("reversed");
    assert!(matches!(err, AppError::DurationMismatch(_)));

    assert!(usage.usage_record(TODAY).expect("read").is_none());
}

#[test]
fn concurrent_sessions_for_one_table_sum_exactly() {
    let app = setup_app();
    let callers = 12u64;

    thread::scope(|scope| {
        for _ in 0..callers {
            let usage = app.state.services.usage.clone();
            scope.spawn(move || {
                usage
                    .record_session(&report(7, "2024-01-01 09:00", "2024-01-01 09:01", 1))
                    .expect("record");
            });
        }
    });

    let record = app
        .state
        .services
        .usage
        .usage_record(TODAY)
        .expect("read")
        .expect("record");
    assert_eq!(record.total_time(7), Some(60 * callers));
}
