//! Shared Kernel
//!
//! Vocabulary every backend crate agrees on:
//! - the error taxonomy ([`error::kind::ErrorKind`]) and its HTTP mapping
//! - the unified [`error::app_error::AppError`] carried across crate boundaries
//! - typed UUID identifiers ([`id::Id`])
//!
//! Nothing here knows about authentication, sessions or storage engines.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
