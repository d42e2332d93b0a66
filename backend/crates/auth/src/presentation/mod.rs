//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::{AuthAppState, CurrentSession};
pub use middleware::{AuthorizationState, authorize};
pub use router::{auth_router, with_authorization};
