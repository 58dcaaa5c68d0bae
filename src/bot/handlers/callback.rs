use teloxide::prelude::*;
use tracing::{info, warn};

use crate::bot::handlers::BotDeps;
use crate::bot::render::UNSUBSCRIBE_CALLBACK;
use crate::database::models::User;

/// Handles the inline "unsubscribe" button attached to mailing
/// messages. Unknown callbacks are acknowledged silently so stale
/// keyboards never error at the user.
pub async fn callback_handler(bot: Bot, q: CallbackQuery, deps: BotDeps) -> ResponseResult<()> {
    let user_id = q.from.id.0 as i64;

    match q.data.as_deref() {
        Some(UNSUBSCRIBE_CALLBACK) => {
            match User::set_mailing_time(&deps.db.pool, user_id, None).await {
                Ok(()) => {
                    info!("user {} unsubscribed from mailing", user_id);
                    bot.answer_callback_query(q.id)
                        .text("Рассылка отключена.")
                        .await?;
                    if let Some(msg) = q.message {
                        bot.send_message(
                            msg.chat.id,
                            "Больше не буду присылать расписание. Вернуть рассылку: /subscribe.",
                        )
                        .await?;
                    }
                }
                Err(err) => {
                    warn!("failed to unsubscribe user {}: {}", user_id, err);
                    bot.answer_callback_query(q.id)
                        .text("Не получилось, попробуй еще раз.")
                        .await?;
                }
            }
        }
        _ => {
            bot.answer_callback_query(q.id).await?;
        }
    }
    Ok(())
}
