//! Daily schedule mailing.
//!
//! A minutely job matches subscribed users against the wall clock in
//! the bot's default timezone and sends each their today's schedule.
//! Per-user failures are logged and skipped; a Telegram flood limit is
//! honored with a bounded retry loop.

use chrono::{Timelike, Utc};
use teloxide::prelude::*;
use teloxide::{ApiError, RequestError};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::bot::render;
use crate::database::connection::DatabaseManager;
use crate::database::models::User;
use crate::schedule::resolver::ScheduleResolver;
use crate::schedule::types::{ScheduleLookup, ScheduleQuery};
use crate::services::timezone::TimezoneResolver;

const MAILING_HEADER: &str = "👋 Привет, это рассылка расписания.";
/// One flood-limit pause plus one retry; beyond that the user is
/// skipped until tomorrow.
const MAX_SEND_ATTEMPTS: u32 = 3;

pub struct MailingService {
    bot: Bot,
    db: DatabaseManager,
    resolver: ScheduleResolver,
    timezones: TimezoneResolver,
    scheduler: JobScheduler,
}

impl MailingService {
    pub async fn new(
        bot: Bot,
        db: DatabaseManager,
        resolver: ScheduleResolver,
        timezones: TimezoneResolver,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self {
            bot,
            db,
            resolver,
            timezones,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let bot = self.bot.clone();
        let db = self.db.clone();
        let resolver = self.resolver.clone();
        let timezones = self.timezones.clone();

        // Every minute on the minute; the tick itself filters by each
        // user's subscribed time.
        let mailing_job = Job::new_async("0 * * * * *", move |_uuid, _l| {
            let bot = bot.clone();
            let db = db.clone();
            let resolver = resolver.clone();
            let timezones = timezones.clone();
            Box::pin(async move {
                run_mailing_tick(bot, db, resolver, timezones).await;
            })
        })?;

        self.scheduler.add(mailing_job).await?;
        self.scheduler.start().await?;

        info!("mailing service started");
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}

async fn run_mailing_tick(
    bot: Bot,
    db: DatabaseManager,
    resolver: ScheduleResolver,
    timezones: TimezoneResolver,
) {
    let now = Utc::now().with_timezone(&timezones.default_zone());
    let clock = format!("{:02}:{:02}", now.hour(), now.minute());

    let subscribers = match User::mailing_list(&db.pool).await {
        Ok(subscribers) => subscribers,
        Err(err) => {
            error!("failed to load mailing list: {}", err);
            return;
        }
    };

    let due: Vec<User> = subscribers
        .into_iter()
        .filter(|user| user.mailing_time.as_deref() == Some(clock.as_str()))
        .collect();
    if due.is_empty() {
        return;
    }

    info!("starting to mail schedules to {} users", due.len());
    let today = timezones.today();

    for user in due {
        let sub_group = (user.sub_group != 0).then_some(user.sub_group);
        let query = ScheduleQuery::single_day(user.group_id, sub_group, today);
        let lookup = resolver.resolve(query).await;

        if let Err(err) = deliver(&bot, &db, user.user_id, &lookup).await {
            error!("mailing to {} failed: {}", user.user_id, err);
        }
        // Spread sends out so a large mailing does not trip the global
        // flood limit immediately.
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    }
}

/// Sends one mailing message with a bounded flood-limit retry. A user
/// who blocked the bot or deleted their account is removed from the
/// store.
async fn deliver(
    bot: &Bot,
    db: &DatabaseManager,
    user_id: i64,
    lookup: &ScheduleLookup,
) -> ResponseResult<()> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        let result = render::send_schedule(
            bot,
            ChatId(user_id),
            lookup,
            "сегодня",
            MAILING_HEADER,
            vec![render::unsubscribe_row()],
        )
        .await;

        match result {
            Ok(()) => {
                info!("mailed schedule to {}", user_id);
                return Ok(());
            }
            Err(RequestError::RetryAfter(delay)) if attempts < MAX_SEND_ATTEMPTS => {
                warn!(
                    "flood limit while mailing to {}, sleeping {:?} (attempt {})",
                    user_id, delay, attempts
                );
                tokio::time::sleep(delay).await;
            }
            Err(RequestError::Api(
                api_err @ (ApiError::BotBlocked
                | ApiError::ChatNotFound
                | ApiError::UserDeactivated),
            )) => {
                warn!("removing user {}: {}", user_id, api_err);
                if let Err(db_err) = User::delete(&db.pool, user_id).await {
                    error!("failed to remove user {}: {}", user_id, db_err);
                }
                return Ok(());
            }
            Err(err) => return Err(err),
        }
    }
}
