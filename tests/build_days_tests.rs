use std::collections::HashMap;

use herzen_schedule_bot::schedule::format::ModifierCleaner;
use herzen_schedule_bot::schedule::resolver::{build_days, parse_instant};
use herzen_schedule_bot::schedule::types::{Building, Room, ScheduleEntry, Teacher};
use herzen_schedule_bot::services::timezone::TimezoneResolver;

fn moscow_resolver() -> TimezoneResolver {
    TimezoneResolver::new("Europe/Moscow", &HashMap::new())
}

fn entry(start: &str, end: &str, name: &str, teacher_id: i64, room_id: i64) -> ScheduleEntry {
    ScheduleEntry {
        start_time: Some(start.to_string()),
        end_time: Some(end.to_string()),
        group_id: Some(12345),
        sub_group_id: None,
        faculty_id: None,
        name: Some(name.to_string()),
        kind: Some("лекция".to_string()),
        note: None,
        teacher_id: Some(teacher_id),
        room_id: Some(room_id),
        class_url: None,
    }
}

fn references() -> (
    HashMap<i64, Teacher>,
    HashMap<i64, Room>,
    HashMap<i64, Building>,
) {
    let teachers = HashMap::from([
        (
            7,
            Teacher {
                id: 7,
                name: Some("Иванов И.И.".to_string()),
                rank: Some("доцент".to_string()),
                atlas_url: Some("https://atlas.example/7".to_string()),
            },
        ),
        (
            8,
            Teacher {
                id: 8,
                name: Some("Петрова А.А.".to_string()),
                rank: Some("старший преподаватель".to_string()),
                atlas_url: None,
            },
        ),
    ]);
    let rooms = HashMap::from([
        (
            31,
            Room {
                id: 31,
                name: Some("101".to_string()),
                building_id: Some(5),
            },
        ),
        (
            32,
            Room {
                id: 32,
                name: Some("202".to_string()),
                building_id: None,
            },
        ),
    ]);
    let buildings = HashMap::from([(
        5,
        Building {
            id: 5,
            name: Some("Главный корпус".to_string()),
        },
    )]);
    (teachers, rooms, buildings)
}

#[test]
fn test_single_day_two_ordered_blocks() {
    let (teachers, rooms, buildings) = references();
    // Deliberately out of order: the second slot first.
    let entries = vec![
        entry(
            "2024-03-04T10:45:00+03:00",
            "2024-03-04T12:15:00+03:00",
            "Базы данных",
            8,
            32,
        ),
        entry(
            "2024-03-04T09:00:00+03:00",
            "2024-03-04T10:30:00+03:00",
            "Математический анализ",
            7,
            31,
        ),
    ];

    let days = build_days(
        &entries,
        &teachers,
        &rooms,
        &buildings,
        &moscow_resolver(),
        &ModifierCleaner::default(),
    );

    assert_eq!(days.len(), 1);
    assert_eq!(days[0].label, "04.03.2024, понедельник");
    assert_eq!(days[0].classes.len(), 2);

    let first = &days[0].classes[0];
    assert_eq!(first.time, "09:00 — 10:30");
    assert_eq!(first.title, "Математический анализ");
    assert_eq!(first.kind, "лек.");
    assert_eq!(first.teacher, "доц. Иванов И.И.");
    assert_eq!(first.teacher_url, "https://atlas.example/7");
    assert_eq!(first.room, "101, Главный корпус");

    let second = &days[0].classes[1];
    assert_eq!(second.time, "10:45 — 12:15");
    assert_eq!(second.teacher, "ст. преп. Петрова А.А.");
    assert_eq!(second.room, "202");
}

#[test]
fn test_multiple_days_in_chronological_order() {
    let (teachers, rooms, buildings) = references();
    let entries = vec![
        entry(
            "2024-03-05T09:00:00+03:00",
            "2024-03-05T10:30:00+03:00",
            "Физика",
            7,
            31,
        ),
        entry(
            "2024-03-04T09:00:00+03:00",
            "2024-03-04T10:30:00+03:00",
            "Химия",
            7,
            31,
        ),
    ];

    let days = build_days(
        &entries,
        &teachers,
        &rooms,
        &buildings,
        &moscow_resolver(),
        &ModifierCleaner::default(),
    );

    assert_eq!(days.len(), 2);
    assert_eq!(days[0].label, "04.03.2024, понедельник");
    assert_eq!(days[1].label, "05.03.2024, вторник");
}

#[test]
fn test_entry_without_timestamps_dropped() {
    let (teachers, rooms, buildings) = references();
    let mut broken = entry(
        "2024-03-04T09:00:00+03:00",
        "2024-03-04T10:30:00+03:00",
        "Сломанная запись",
        7,
        31,
    );
    broken.start_time = None;
    let entries = vec![
        broken,
        entry(
            "2024-03-04T10:45:00+03:00",
            "2024-03-04T12:15:00+03:00",
            "Нормальная запись",
            7,
            31,
        ),
    ];

    let days = build_days(
        &entries,
        &teachers,
        &rooms,
        &buildings,
        &moscow_resolver(),
        &ModifierCleaner::default(),
    );

    assert_eq!(days.len(), 1);
    assert_eq!(days[0].classes.len(), 1);
    assert_eq!(days[0].classes[0].title, "Нормальная запись");
}

#[test]
fn test_unresolved_references_render_empty() {
    let entries = vec![entry(
        "2024-03-04T09:00:00+03:00",
        "2024-03-04T10:30:00+03:00",
        "Лекция без справочников",
        999,
        999,
    )];

    let days = build_days(
        &entries,
        &HashMap::new(),
        &HashMap::new(),
        &HashMap::new(),
        &moscow_resolver(),
        &ModifierCleaner::default(),
    );

    assert_eq!(days.len(), 1);
    let block = &days[0].classes[0];
    assert_eq!(block.teacher, "");
    assert_eq!(block.room, "");
    assert_eq!(block.title, "Лекция без справочников");
}

#[test]
fn test_noise_modifier_suppressed() {
    let (teachers, rooms, buildings) = references();
    let mut noisy = entry(
        "2024-03-04T09:00:00+03:00",
        "2024-03-04T10:30:00+03:00",
        "Лекция",
        7,
        31,
    );
    noisy.note = Some("(8.09—6.10, 8.09—6.10)".to_string());

    let days = build_days(
        &[noisy],
        &teachers,
        &rooms,
        &buildings,
        &moscow_resolver(),
        &ModifierCleaner::default(),
    );

    assert_eq!(days[0].classes[0].modifier, "");
}

#[test]
fn test_utc_timestamps_localized_to_moscow() {
    let (teachers, rooms, buildings) = references();
    // 06:00Z is 09:00 in Moscow.
    let entries = vec![entry(
        "2024-03-04T06:00:00Z",
        "2024-03-04T07:30:00Z",
        "Лекция",
        7,
        31,
    )];

    let days = build_days(
        &entries,
        &teachers,
        &rooms,
        &buildings,
        &moscow_resolver(),
        &ModifierCleaner::default(),
    );

    assert_eq!(days[0].classes[0].time, "09:00 — 10:30");
}

#[test]
fn test_faculty_timezone_override() {
    let (teachers, rooms, buildings) = references();
    let overrides = HashMap::from([(42i64, "Asia/Yekaterinburg".to_string())]);
    let resolver = TimezoneResolver::new("Europe/Moscow", &overrides);

    let mut eastern = entry(
        "2024-03-04T06:00:00Z",
        "2024-03-04T07:30:00Z",
        "Лекция",
        7,
        31,
    );
    eastern.faculty_id = Some(42);

    let days = build_days(&[eastern], &teachers, &rooms, &buildings, &resolver, &ModifierCleaner::default());

    // 06:00Z is 11:00 in Yekaterinburg (UTC+5).
    assert_eq!(days[0].classes[0].time, "11:00 — 12:30");
}

#[test]
fn test_parse_instant_naive_assumes_local_zone() {
    let tz = chrono_tz::Europe::Moscow;
    let parsed = parse_instant("2024-03-04T09:00:00", tz).unwrap();
    assert_eq!(parsed.format("%H:%M").to_string(), "09:00");
}

#[test]
fn test_parse_instant_rejects_garbage() {
    let tz = chrono_tz::Europe::Moscow;
    assert!(parse_instant("not a date", tz).is_none());
}
