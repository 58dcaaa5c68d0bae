//! # Herzen Schedule Bot
//!
//! A Telegram bot that looks up and delivers Herzen University class
//! schedules, with per-user group configuration and an optional daily
//! mailing.
//!
//! ## Features
//! - Schedule lookups for today/tomorrow/this week/next week
//! - Group selection validated against the live group hierarchy
//! - Redis-backed caching of schedules, reference data and the group
//!   tree (the bot keeps working without a cache store)
//! - Daily schedule mailing at a per-user time
//! - Persistent user storage with SQLite

/// Bot command handlers, callbacks and message rendering
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// User database connection and models
pub mod database;
/// Schedule resolution pipeline: upstream API, caches, normalization
pub mod schedule;
/// Background services: mailing, group refresh, health, timezones
pub mod services;
/// Small date helpers shared by commands and services
pub mod utils;
