//! Infrastructure Layer
//!
//! Database, session store and mail relay implementations of the domain
//! ports, plus in-memory stand-ins.

pub mod mailer;
pub mod memory;
pub mod postgres;
pub mod redis;

pub use mailer::{HttpMailer, LogMailer};
pub use memory::{InMemorySessionStore, InMemoryUserRepository};
pub use postgres::PgUserRepository;
pub use redis::RedisSessionStore;
