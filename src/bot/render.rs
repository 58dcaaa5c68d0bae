//! HTML rendering of resolved schedules and the standard reply
//! keyboards. All user-facing text is Russian, matching the audience.

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode};
use teloxide::utils::html;

use crate::schedule::types::{DaySchedule, ScheduleLookup};

/// Telegram rejects messages over 4096 chars; leave headroom for the
/// header and footer around the schedule body.
const MESSAGE_LIMIT: usize = 4000;

pub const UNSUBSCRIBE_CALLBACK: &str = "mailing:unsubscribe";

/// Inline keyboard with the "check on the site" link and optional
/// extra rows.
pub fn view_keyboard(view_url: &str, extra_rows: Vec<Vec<InlineKeyboardButton>>) -> InlineKeyboardMarkup {
    let mut rows = Vec::new();
    if let Ok(url) = reqwest::Url::parse(view_url) {
        rows.push(vec![InlineKeyboardButton::url("Проверить на сайте", url)]);
    }
    rows.extend(extra_rows);
    InlineKeyboardMarkup::new(rows)
}

pub fn unsubscribe_row() -> Vec<InlineKeyboardButton> {
    vec![InlineKeyboardButton::callback(
        "Отписаться от рассылки",
        UNSUBSCRIBE_CALLBACK,
    )]
}

/// Renders day blocks into the message body.
pub fn render_days(days: &[DaySchedule]) -> String {
    let mut text = String::new();
    for day in days {
        text.push_str(&format!("\n🗓 {}\n", html::escape(&day.label)));
        for class in &day.classes {
            text.push_str(&format!("\n⏰ {}", html::escape(&class.time)));
            if !class.modifier.is_empty() {
                text.push_str(&format!(" <i>ℹ {}</i>", html::escape(&class.modifier)));
            }
            let title = if class.class_url.is_empty() {
                format!("<b>{}</b>", html::escape(&class.title))
            } else {
                format!(
                    "<b><a href=\"{}\">{}</a></b>",
                    class.class_url,
                    html::escape(&class.title)
                )
            };
            if class.kind.is_empty() {
                text.push_str(&format!("\n{}", title));
            } else {
                text.push_str(&format!("\n{} [{}]", title, html::escape(&class.kind)));
            }
            if !class.teacher.is_empty() {
                if class.teacher_url.is_empty() {
                    text.push_str(&format!("\n{}", html::escape(&class.teacher)));
                } else {
                    text.push_str(&format!(
                        "\n<a href=\"{}\">{}</a>",
                        class.teacher_url,
                        html::escape(&class.teacher)
                    ));
                }
            }
            if !class.room.is_empty() {
                text.push_str(&format!("\n{}", html::escape(&class.room)));
            }
            text.push('\n');
        }
    }
    text
}

/// Sends a resolved schedule with the standard wording for the three
/// outcomes: unavailable, no classes, schedule body (or too-long
/// overflow).
pub async fn send_schedule(
    bot: &Bot,
    chat_id: ChatId,
    lookup: &ScheduleLookup,
    period: &str,
    header: &str,
    extra_rows: Vec<Vec<InlineKeyboardButton>>,
) -> ResponseResult<()> {
    let keyboard = view_keyboard(&lookup.view_url, extra_rows);
    let header = if header.is_empty() {
        String::new()
    } else {
        format!("{}\n\n", header)
    };

    let Some(days) = &lookup.days else {
        bot.send_message(
            chat_id,
            format!(
                "{}😖 Упс, кажется, расписание не отвечает. Попробуй еще раз.\n\
                 Если на сайте по кнопке ниже тоже ничего не работает, бот тут ни при чем.",
                header
            ),
        )
        .reply_markup(keyboard)
        .await?;
        return Ok(());
    };

    if days.is_empty() {
        bot.send_message(
            chat_id,
            format!("{}🎉 На {} занятий нет, можно отдыхать.", header, period),
        )
        .reply_markup(keyboard)
        .await?;
        return Ok(());
    }

    let body = render_days(days);
    if body.len() > MESSAGE_LIMIT {
        bot.send_message(
            chat_id,
            format!(
                "{}Сообщение получилось слишком длинным, так что придется смотреть по ссылке...",
                header
            ),
        )
        .reply_markup(keyboard)
        .await?;
        return Ok(());
    }

    bot.send_message(
        chat_id,
        format!("{}Вот твое расписание на {}:\n{}", header, period, body),
    )
    .parse_mode(ParseMode::Html)
    .disable_web_page_preview(true)
    .reply_markup(keyboard)
    .await?;
    Ok(())
}
