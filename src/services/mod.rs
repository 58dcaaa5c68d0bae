pub mod health;
pub mod mailing;
pub mod refresh;
pub mod timezone;
