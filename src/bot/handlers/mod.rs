pub mod callback;
pub mod message;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;

use crate::database::connection::DatabaseManager;
use crate::schedule::cache::ScheduleCache;
use crate::schedule::groups::GroupDirectory;
use crate::schedule::resolver::ScheduleResolver;
use crate::services::timezone::TimezoneResolver;

/// Everything the handlers need, wired once at startup and cloned into
/// the dispatch closures. No ambient globals.
#[derive(Clone)]
pub struct BotDeps {
    pub db: DatabaseManager,
    pub resolver: ScheduleResolver,
    pub groups: GroupDirectory,
    pub schedule_cache: ScheduleCache,
    pub timezones: TimezoneResolver,
    pub admin_id: Option<i64>,
    pub default_mailing_time: String,
}

pub struct BotHandler {
    deps: BotDeps,
}

impl BotHandler {
    pub fn new(deps: BotDeps) -> Self {
        Self { deps }
    }

    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        let deps = self.deps.clone();
        let deps_callback = self.deps.clone();

        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<crate::bot::commands::Command>()
                    .endpoint(move |bot, msg, cmd| {
                        let deps = deps.clone();
                        async move {
                            message::command_handler(bot, msg, cmd, deps)
                                .await
                                .map_err(Into::into)
                        }
                    }),
            )
            .branch(Update::filter_callback_query().endpoint(move |bot, q| {
                let deps = deps_callback.clone();
                async move {
                    callback::callback_handler(bot, q, deps)
                        .await
                        .map_err(Into::into)
                }
            }))
    }
}
