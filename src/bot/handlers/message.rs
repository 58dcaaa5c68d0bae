use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::{admin, schedule, settings, Command};
use crate::bot::handlers::BotDeps;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    deps: BotDeps,
) -> ResponseResult<()> {
    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
        Command::Start => {
            bot.send_message(
                msg.chat.id,
                "👋 Привет! Я показываю расписание занятий.\n\n\
                 Сначала выбери свою группу: /setgroup <номер группы>.\n\
                 Потом спрашивай /today, /tomorrow, /week или /nextweek.\n\
                 Команда /subscribe включит ежедневную рассылку.",
            )
            .await?;
        }
        Command::Today => {
            schedule::handle_period(&bot, &msg, &deps, schedule::Period::Today).await?;
        }
        Command::Tomorrow => {
            schedule::handle_period(&bot, &msg, &deps, schedule::Period::Tomorrow).await?;
        }
        Command::Week => {
            schedule::handle_period(&bot, &msg, &deps, schedule::Period::ThisWeek).await?;
        }
        Command::NextWeek => {
            schedule::handle_period(&bot, &msg, &deps, schedule::Period::NextWeek).await?;
        }
        Command::SetGroup { args } => {
            settings::handle_set_group(&bot, &msg, &deps, &args).await?;
        }
        Command::Subscribe { time } => {
            settings::handle_subscribe(&bot, &msg, &deps, &time).await?;
        }
        Command::Unsubscribe => {
            settings::handle_unsubscribe(&bot, &msg, &deps).await?;
        }
        Command::ClearCache => {
            admin::handle_clear_cache(&bot, &msg, &deps).await?;
        }
        Command::RefreshGroups => {
            admin::handle_refresh_groups(&bot, &msg, &deps).await?;
        }
    }
    Ok(())
}
