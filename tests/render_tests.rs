use herzen_schedule_bot::bot::render::{render_days, unsubscribe_row, view_keyboard};
use herzen_schedule_bot::schedule::types::{ClassBlock, DaySchedule};

fn block(time: &str, title: &str) -> ClassBlock {
    ClassBlock {
        time: time.to_string(),
        modifier: String::new(),
        title: title.to_string(),
        kind: "лек.".to_string(),
        teacher: "доц. Иванов И.И.".to_string(),
        teacher_url: String::new(),
        room: "101, Главный корпус".to_string(),
        class_url: String::new(),
    }
}

#[test]
fn test_render_day_header_and_class_lines() {
    let days = vec![DaySchedule {
        label: "04.03.2024, понедельник".to_string(),
        classes: vec![block("09:00 — 10:30", "Математический анализ")],
    }];

    let text = render_days(&days);
    assert!(text.contains("🗓 04.03.2024, понедельник"));
    assert!(text.contains("⏰ 09:00 — 10:30"));
    assert!(text.contains("<b>Математический анализ</b> [лек.]"));
    assert!(text.contains("доц. Иванов И.И."));
    assert!(text.contains("101, Главный корпус"));
}

#[test]
fn test_render_modifier_in_italics() {
    let mut class = block("09:00 — 10:30", "Физика");
    class.modifier = "дистанционно".to_string();
    let days = vec![DaySchedule {
        label: "04.03.2024, понедельник".to_string(),
        classes: vec![class],
    }];

    let text = render_days(&days);
    assert!(text.contains("<i>ℹ дистанционно</i>"));
}

#[test]
fn test_render_links_title_and_teacher() {
    let mut class = block("09:00 — 10:30", "Физика");
    class.class_url = "https://example.test/class/1".to_string();
    class.teacher_url = "https://atlas.example/7".to_string();
    let days = vec![DaySchedule {
        label: "04.03.2024, понедельник".to_string(),
        classes: vec![class],
    }];

    let text = render_days(&days);
    assert!(text.contains("<b><a href=\"https://example.test/class/1\">Физика</a></b>"));
    assert!(text.contains("<a href=\"https://atlas.example/7\">доц. Иванов И.И.</a>"));
}

#[test]
fn test_render_escapes_html_in_user_visible_text() {
    let mut class = block("09:00 — 10:30", "Алгебра <и> логика");
    class.room = String::new();
    class.teacher = String::new();
    let days = vec![DaySchedule {
        label: "04.03.2024, понедельник".to_string(),
        classes: vec![class],
    }];

    let text = render_days(&days);
    assert!(text.contains("Алгебра &lt;и&gt; логика"));
    assert!(!text.contains("<и>"));
}

#[test]
fn test_render_omits_empty_fields() {
    let mut class = block("09:00 — 10:30", "Физика");
    class.teacher = String::new();
    class.room = String::new();
    class.kind = String::new();
    let days = vec![DaySchedule {
        label: "04.03.2024, понедельник".to_string(),
        classes: vec![class],
    }];

    let text = render_days(&days);
    assert!(text.contains("<b>Физика</b>\n"));
    assert!(!text.contains("["));
    assert!(!text.contains("Иванов"));
}

#[test]
fn test_view_keyboard_has_site_link() {
    let keyboard = view_keyboard("https://guide.herzen.spb.ru/schedule/12345/by-dates", vec![]);
    assert_eq!(keyboard.inline_keyboard.len(), 1);
    assert_eq!(keyboard.inline_keyboard[0][0].text, "Проверить на сайте");
}

#[test]
fn test_view_keyboard_skips_invalid_url() {
    let keyboard = view_keyboard("not a url", vec![unsubscribe_row()]);
    // Only the extra row survives.
    assert_eq!(keyboard.inline_keyboard.len(), 1);
    assert_eq!(keyboard.inline_keyboard[0][0].text, "Отписаться от рассылки");
}

#[test]
fn test_view_keyboard_appends_extra_rows() {
    let keyboard = view_keyboard(
        "https://guide.herzen.spb.ru/schedule/12345/by-dates",
        vec![unsubscribe_row()],
    );
    assert_eq!(keyboard.inline_keyboard.len(), 2);
    assert_eq!(keyboard.inline_keyboard[1][0].text, "Отписаться от рассылки");
}
