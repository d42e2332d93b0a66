//! Value Object Module

pub mod activation_code;
pub mod email;
pub mod person_name;
pub mod role;
pub mod session_id;
pub mod user_id;
pub mod user_password;

pub use activation_code::ActivationCode;
pub use email::Email;
pub use person_name::PersonName;
pub use role::Role;
pub use session_id::SessionId;
pub use user_id::UserId;
pub use user_password::UserPassword;
