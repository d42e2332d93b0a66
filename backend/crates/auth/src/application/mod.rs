//! Application Layer
//!
//! Use cases and application services.

pub mod activate;
pub mod authorize;
pub mod config;
pub mod credentials;
pub(crate) mod mail;
pub mod refresh;
pub mod resend_activation;
pub mod session;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod tokens;

// Re-exports
pub use activate::ActivateAccountUseCase;
pub use authorize::{AuthContext, AuthenticatedSession, AuthorizeInput, AuthorizeUseCase};
pub use config::AuthConfig;
pub use credentials::CredentialService;
pub use refresh::{RefreshInput, RefreshTokensUseCase};
pub use resend_activation::ResendActivationUseCase;
pub use session::AuthOutput;
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};
pub use tokens::{SigningKeys, TokenIssuer, TokenKeyError, parse_algorithm};
