pub mod admin;
pub mod schedule;
pub mod settings;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Команды бота:")]
pub enum Command {
    #[command(description = "показать список команд")]
    Help,
    #[command(description = "начать работу с ботом")]
    Start,
    #[command(description = "расписание на сегодня")]
    Today,
    #[command(description = "расписание на завтра")]
    Tomorrow,
    #[command(description = "расписание на эту неделю")]
    Week,
    #[command(description = "расписание на следующую неделю")]
    NextWeek,
    #[command(description = "выбрать группу: /setgroup <номер группы> [подгруппа]")]
    SetGroup { args: String },
    #[command(description = "подписаться на рассылку: /subscribe [ЧЧ:ММ]")]
    Subscribe { time: String },
    #[command(description = "отписаться от рассылки")]
    Unsubscribe,
    #[command(description = "служебная: сбросить кэш расписаний")]
    ClearCache,
    #[command(description = "служебная: обновить список групп")]
    RefreshGroups,
}
