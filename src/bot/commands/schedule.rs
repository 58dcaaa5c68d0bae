use chrono::Duration;
use teloxide::prelude::*;
use tracing::{error, info};

use crate::bot::handlers::BotDeps;
use crate::bot::render;
use crate::database::models::User;
use crate::schedule::types::ScheduleQuery;
use crate::utils::datetime::{next_week_range, week_range};

#[derive(Debug, Clone, Copy)]
pub enum Period {
    Today,
    Tomorrow,
    ThisWeek,
    NextWeek,
}

impl Period {
    /// Accusative phrasing for "расписание на ...".
    fn label(self) -> &'static str {
        match self {
            Period::Today => "сегодня",
            Period::Tomorrow => "завтра",
            Period::ThisWeek => "эту неделю",
            Period::NextWeek => "следующую неделю",
        }
    }
}

pub async fn handle_period(
    bot: &Bot,
    msg: &Message,
    deps: &BotDeps,
    period: Period,
) -> ResponseResult<()> {
    let user_id = msg.chat.id.0;

    let user = match User::find(&deps.db.pool, user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            bot.send_message(
                msg.chat.id,
                "Кажется, я не знаю, где ты учишься. \
                 Выбери группу командой /setgroup <номер группы>, чтобы я мог вывести твое расписание.",
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
    };

    info!(
        "schedule request: user {} group {} period {:?}",
        user_id, user.group_id, period
    );

    let today = deps.timezones.today();
    let sub_group = (user.sub_group != 0).then_some(user.sub_group);
    let query = match period {
        Period::Today => ScheduleQuery::single_day(user.group_id, sub_group, today),
        Period::Tomorrow => {
            ScheduleQuery::single_day(user.group_id, sub_group, today + Duration::days(1))
        }
        Period::ThisWeek => {
            let (monday, sunday) = week_range(today);
            ScheduleQuery::range(user.group_id, sub_group, monday, sunday)
        }
        Period::NextWeek => {
            let (monday, sunday) = next_week_range(today);
            ScheduleQuery::range(user.group_id, sub_group, monday, sunday)
        }
    };

    let lookup = deps.resolver.resolve(query).await;
    if lookup.days.is_none() {
        error!("failed to get schedule for user {}", user_id);
    }
    render::send_schedule(bot, msg.chat.id, &lookup, period.label(), "", Vec::new()).await
}
