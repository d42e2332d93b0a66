//! Entity Module

pub mod claims;
pub mod session;
pub mod user;

pub use claims::Claims;
pub use session::{IssuedSession, TokenPair};
pub use user::User;
