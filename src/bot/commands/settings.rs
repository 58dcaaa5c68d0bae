use teloxide::prelude::*;
use tracing::{error, info};

use crate::bot::handlers::BotDeps;
use crate::database::models::User;
use crate::utils::datetime::normalize_clock;

/// `/setgroup <group id> [subgroup]`: validates the group against the
/// directory tree and stores the user's configuration.
pub async fn handle_set_group(
    bot: &Bot,
    msg: &Message,
    deps: &BotDeps,
    args: &str,
) -> ResponseResult<()> {
    let user_id = msg.chat.id.0;
    let mut parts = args.split_whitespace();
    let group_id: Option<i64> = parts.next().and_then(|raw| raw.parse().ok());
    let sub_group: Option<i64> = parts.next().and_then(|raw| raw.parse().ok());

    let Some(group_id) = group_id else {
        bot.send_message(
            msg.chat.id,
            "Нужен номер группы: /setgroup 12345 или /setgroup 12345 1.",
        )
        .await?;
        return Ok(());
    };

    if !deps.groups.is_valid_group(group_id).await {
        bot.send_message(
            msg.chat.id,
            "Не нашел такую группу. Проверь номер на сайте расписания \
             или попробуй позже, если справочник групп сейчас недоступен.",
        )
        .await?;
        return Ok(());
    }

    let sub_group = sub_group.unwrap_or(0);
    if let Err(err) = User::upsert(&deps.db.pool, user_id, group_id, sub_group).await {
        error!("failed to save group for user {}: {}", user_id, err);
        bot.send_message(msg.chat.id, "Не получилось сохранить, попробуй еще раз.")
            .await?;
        return Ok(());
    }

    info!(
        "user {} configured group {} sub_group {}",
        user_id, group_id, sub_group
    );

    let sub_groups = deps.groups.sub_groups_of(group_id).await.unwrap_or_default();
    let mut reply = format!("Запомнил: группа {}", group_id);
    if sub_group != 0 {
        reply.push_str(&format!(", подгруппа {}", sub_group));
    } else if !sub_groups.is_empty() {
        let names: Vec<&str> = sub_groups.iter().map(|s| s.name.as_str()).collect();
        reply.push_str(&format!(
            ".\nУ группы есть подгруппы ({}), можно указать: /setgroup {} <подгруппа>",
            names.join(", "),
            group_id
        ));
    }
    reply.push_str(".\nТеперь спрашивай /today или /week.");
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

/// `/subscribe [HH:MM]`: enables the daily mailing at the given (or
/// default) local time.
pub async fn handle_subscribe(
    bot: &Bot,
    msg: &Message,
    deps: &BotDeps,
    time: &str,
) -> ResponseResult<()> {
    let user_id = msg.chat.id.0;

    match User::find(&deps.db.pool, user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            bot.send_message(
                msg.chat.id,
                "Сначала выбери группу: /setgroup <номер группы>.",
            )
            .await?;
            return Ok(());
        }
        Err(err) => {
            error!("failed to load user {}: {}", user_id, err);
            bot.send_message(msg.chat.id, "Что-то пошло не так, попробуй еще раз.")
                .await?;
            return Ok(());
        }
    }

    // Stored padded so the mailing tick's clock comparison matches
    // inputs like "7:30".
    let time = time.trim();
    let mailing_time = if time.is_empty() {
        deps.default_mailing_time.clone()
    } else if let Some(normalized) = normalize_clock(time) {
        normalized
    } else {
        bot.send_message(
            msg.chat.id,
            "Время нужно в формате ЧЧ:ММ, например /subscribe 07:30.",
        )
        .await?;
        return Ok(());
    };

    if let Err(err) = User::set_mailing_time(&deps.db.pool, user_id, Some(&mailing_time)).await {
        error!("failed to subscribe user {}: {}", user_id, err);
        bot.send_message(msg.chat.id, "Не получилось сохранить, попробуй еще раз.")
            .await?;
        return Ok(());
    }

    info!("user {} subscribed to mailing at {}", user_id, mailing_time);
    bot.send_message(
        msg.chat.id,
        format!(
            "Буду присылать расписание каждый день около {}. Отключить: /unsubscribe.",
            mailing_time
        ),
    )
    .await?;
    Ok(())
}

pub async fn handle_unsubscribe(bot: &Bot, msg: &Message, deps: &BotDeps) -> ResponseResult<()> {
    let user_id = msg.chat.id.0;
    if let Err(err) = User::set_mailing_time(&deps.db.pool, user_id, None).await {
        error!("failed to unsubscribe user {}: {}", user_id, err);
        bot.send_message(msg.chat.id, "Что-то пошло не так, попробуй еще раз.")
            .await?;
        return Ok(());
    }
    info!("user {} unsubscribed from mailing", user_id);
    bot.send_message(
        msg.chat.id,
        "Рассылка отключена. Вернуть: /subscribe.",
    )
    .await?;
    Ok(())
}
