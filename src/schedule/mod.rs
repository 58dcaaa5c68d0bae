//! Schedule resolution pipeline: upstream client, caches, group
//! directory and the normalizer that produces per-day formatted
//! schedules.

pub mod cache;
pub mod format;
pub mod groups;
pub mod reference;
pub mod resolver;
pub mod types;
pub mod upstream;
