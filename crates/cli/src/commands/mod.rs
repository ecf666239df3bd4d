//! CLI subcommand implementations

pub mod configure;
pub mod health;
pub mod inspect;
pub mod recommend;
