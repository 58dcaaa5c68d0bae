use teloxide::prelude::*;
use tracing::info;

use crate::bot::handlers::BotDeps;

/// `/clearcache`: drops every memoized schedule response. Useful when
/// the upstream served stale or broken data within the cache TTL.
pub async fn handle_clear_cache(bot: &Bot, msg: &Message, deps: &BotDeps) -> ResponseResult<()> {
    if !is_admin(msg, deps) {
        bot.send_message(msg.chat.id, "Эта команда только для администратора.")
            .await?;
        return Ok(());
    }

    let dropped = deps.schedule_cache.clear().await;
    info!("admin cleared schedule cache: {} keys", dropped);
    bot.send_message(
        msg.chat.id,
        format!("Сбросил кэш расписаний: {} записей.", dropped),
    )
    .await?;
    Ok(())
}

/// `/refreshgroups`: rebuilds the group tree outside the daily
/// schedule.
pub async fn handle_refresh_groups(bot: &Bot, msg: &Message, deps: &BotDeps) -> ResponseResult<()> {
    if !is_admin(msg, deps) {
        bot.send_message(msg.chat.id, "Эта команда только для администратора.")
            .await?;
        return Ok(());
    }

    let reply = if deps.groups.refresh().await {
        "Список групп обновлен."
    } else {
        "Не получилось обновить список групп: источник не отвечает."
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

fn is_admin(msg: &Message, deps: &BotDeps) -> bool {
    match deps.admin_id {
        Some(admin_id) => msg.chat.id.0 == admin_id,
        None => false,
    }
}
