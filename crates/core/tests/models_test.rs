use chrono::{DateTime, Duration, TimeZone, Utc};
use clinic_core::models::{
    account::Role,
    appointment::{Appointment, BookRequest},
    schedule::{ranges_overlap, ScheduleWindow},
    slot::{is_slot_aligned, DaySchedule},
    timestamp,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, hour, minute, 0).unwrap()
}

fn window(id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> ScheduleWindow {
    ScheduleWindow {
        id,
        doctor_id: 1,
        start_time: start,
        end_time: end,
    }
}

fn appointment(id: i64, patient_id: i64, start: DateTime<Utc>, active: bool) -> Appointment {
    Appointment {
        id,
        doctor_id: 1,
        patient_id,
        start_time: start,
        active,
        cancelled_at: None,
    }
}

#[rstest]
#[case(at(9, 0), at(9, 30), true)] // identical
#[case(at(9, 0), at(9, 15), true)] // same start
#[case(at(8, 45), at(9, 30), true)] // same end
#[case(at(9, 15), at(10, 0), true)] // start inside
#[case(at(8, 0), at(9, 15), true)] // end inside
#[case(at(8, 0), at(10, 0), true)] // contains
#[case(at(9, 30), at(10, 0), false)] // touches end
#[case(at(8, 0), at(9, 0), false)] // touches start
#[case(at(11, 0), at(12, 0), false)]
fn test_window_overlap(
    #[case] start: DateTime<Utc>,
    #[case] end: DateTime<Utc>,
    #[case] expected: bool,
) {
    let existing = window(1, at(9, 0), at(9, 30));

    assert_eq!(existing.overlaps(start, end), expected);
    assert_eq!(ranges_overlap(start, end, existing.start_time, existing.end_time), expected);
}

#[rstest]
#[case(at(9, 0), true)]
#[case(at(9, 15), true)]
#[case(at(9, 29), true)]
#[case(at(9, 30), false)]
#[case(at(8, 59), false)]
fn test_window_contains_is_half_open(#[case] instant: DateTime<Utc>, #[case] expected: bool) {
    assert_eq!(window(1, at(9, 0), at(9, 30)).contains(instant), expected);
}

#[rstest]
#[case(at(9, 0), true)]
#[case(at(9, 45), true)]
#[case(at(9, 10), false)]
#[case(at(9, 0) + Duration::seconds(30), false)]
#[case(at(9, 0) + Duration::milliseconds(1), false)]
fn test_slot_alignment(#[case] instant: DateTime<Utc>, #[case] expected: bool) {
    assert_eq!(is_slot_aligned(instant), expected);
}

#[test]
fn test_day_schedule_merges_bookings() {
    let schedule = DaySchedule::new(
        1,
        vec![window(1, at(9, 0), at(9, 30))],
        vec![appointment(5, 7, at(9, 0), true)],
    );

    let slots: Vec<_> = schedule.slots().collect();

    assert_eq!(slots.len(), 2);
    assert_eq!(slots[0].start_time, at(9, 0));
    assert!(slots[0].booked);
    assert_eq!(slots[0].appointment_id, Some(5));
    assert_eq!(slots[0].patient_id, Some(7));
    assert_eq!(slots[1].start_time, at(9, 15));
    assert!(!slots[1].booked);
    assert_eq!(slots[1].appointment_id, None);
}

#[test]
fn test_day_schedule_orders_windows_and_ignores_cancelled() {
    let schedule = DaySchedule::new(
        1,
        vec![window(2, at(14, 0), at(14, 30)), window(1, at(9, 0), at(9, 15))],
        vec![appointment(8, 3, at(14, 15), false)],
    );

    let starts: Vec<_> = schedule.slots().map(|s| s.start_time).collect();
    assert_eq!(starts, vec![at(9, 0), at(14, 0), at(14, 15)]);
    assert!(schedule.slots().all(|s| !s.booked));
}

#[test]
fn test_day_schedule_is_restartable() {
    let schedule = DaySchedule::new(
        1,
        vec![window(1, at(9, 0), at(10, 0))],
        vec![appointment(1, 2, at(9, 30), true)],
    );

    let first: Vec<_> = schedule.slots().collect();
    let second: Vec<_> = schedule.slots().collect();

    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
}

#[test]
fn test_slot_starts_stay_inside_their_window() {
    let windows = vec![window(1, at(9, 0), at(10, 0)), window(2, at(13, 15), at(13, 45))];
    let schedule = DaySchedule::new(1, windows.clone(), vec![]);

    for slot in schedule.slots() {
        assert!(is_slot_aligned(slot.start_time));
        assert!(windows.iter().any(|w| w.contains(slot.start_time)));
    }
}

#[rstest]
#[case("doctor", Ok(Role::Doctor))]
#[case("Doctor", Ok(Role::Doctor))]
#[case(" PATIENT ", Ok(Role::Patient))]
#[case("nurse", Err(()))]
#[case("", Err(()))]
fn test_role_parsing(#[case] raw: &str, #[case] expected: Result<Role, ()>) {
    assert_eq!(raw.parse::<Role>().map_err(|_| ()), expected);
}

#[test]
fn test_request_timestamp_wire_format() {
    let json = r#"{"doctorname":"Dr. Grey","starttime":"2024-05-06 09:15:00","token":"abc"}"#;
    let request: BookRequest = serde_json::from_str(json).expect("Failed to deserialize request");

    assert_eq!(request.starttime, at(9, 15));
    assert_eq!(timestamp::format(&request.starttime), "2024-05-06 09:15:00");

    let bad = r#"{"doctorname":"Dr. Grey","starttime":"09:15","token":"abc"}"#;
    assert!(serde_json::from_str::<BookRequest>(bad).is_err());
}
