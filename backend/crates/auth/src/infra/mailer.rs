//! Activation Mailers
//!
//! `HttpMailer` hands the message to a JSON mail relay; `LogMailer` only
//! records that a message would have been sent, optionally with the code so
//! local accounts can still be activated.

use std::time::Duration;

use serde::Serialize;

use crate::domain::entity::user::User;
use crate::domain::repository::{ActivationMailer, MailError};

const ACTIVATION_TEMPLATE: &str = "account-activation";

/// Mailer for when no relay is configured.
///
/// The activation code is logged at debug level only when built with
/// [`LogMailer::revealing`].
#[derive(Debug, Clone, Default)]
pub struct LogMailer {
    reveal_codes: bool,
}

impl LogMailer {
    pub fn revealing() -> Self {
        Self { reveal_codes: true }
    }

    fn revealed_code<'a>(&self, user: &'a User) -> Option<&'a str> {
        if !self.reveal_codes {
            return None;
        }
        user.activation_code.as_ref().map(|code| code.expose())
    }
}

impl ActivationMailer for LogMailer {
    async fn send_activation_email(&self, user: &User) -> Result<(), MailError> {
        tracing::info!(
            user_id = %user.user_id,
            email_domain = user.email.domain(),
            "Activation email suppressed (no mail relay configured)"
        );
        if let Some(code) = self.revealed_code(user) {
            tracing::debug!(user_id = %user.user_id, activation_code = code, "Activation code");
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayMessage<'a> {
    to: &'a str,
    template: &'static str,
    variables: ActivationVariables<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivationVariables<'a> {
    first_name: &'a str,
    activation_code: &'a str,
}

/// Posts activation messages to an HTTP mail relay.
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    relay_url: String,
}

impl HttpMailer {
    pub fn new(relay_url: impl Into<String>, timeout: Duration) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            relay_url: relay_url.into(),
        })
    }
}

impl ActivationMailer for HttpMailer {
    async fn send_activation_email(&self, user: &User) -> Result<(), MailError> {
        let code = user
            .activation_code
            .as_ref()
            .ok_or_else(|| MailError::Transport("User has no activation code".to_string()))?;

        let message = RelayMessage {
            to: user.email.as_str(),
            template: ACTIVATION_TEMPLATE,
            variables: ActivationVariables {
                first_name: user.first_name.as_str(),
                activation_code: code.expose(),
            },
        };

        let response = self
            .client
            .post(&self.relay_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        activation_code::ActivationCode, email::Email, person_name::PersonName,
        user_password::UserPassword,
    };
    use platform::password::{ClearTextPassword, HashingCost};

    fn pending_user() -> User {
        let hash = ClearTextPassword::for_verification("irrelevant".to_string())
            .hash(HashingCost::minimal(), None)
            .unwrap();
        User::new_inactive(
            Email::new("ada@example.com").unwrap(),
            UserPassword::from_hashed(hash),
            PersonName::new("Ada", "first_name").unwrap(),
            PersonName::new("Lovelace", "last_name").unwrap(),
            ActivationCode::from_db("ABCD2345".to_string()),
        )
    }

    #[test]
    fn test_relay_message_shape() {
        let user = pending_user();
        let message = RelayMessage {
            to: user.email.as_str(),
            template: ACTIVATION_TEMPLATE,
            variables: ActivationVariables {
                first_name: user.first_name.as_str(),
                activation_code: "ABCD2345",
            },
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["to"], "ada@example.com");
        assert_eq!(json["template"], "account-activation");
        assert_eq!(json["variables"]["firstName"], "Ada");
        assert_eq!(json["variables"]["activationCode"], "ABCD2345");
    }

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let user = pending_user();
        assert!(LogMailer::default().send_activation_email(&user).await.is_ok());
        assert!(LogMailer::revealing().send_activation_email(&user).await.is_ok());
    }

    #[test]
    fn test_log_mailer_reveals_code_only_when_asked() {
        let user = pending_user();
        assert_eq!(LogMailer::default().revealed_code(&user), None);
        assert_eq!(LogMailer::revealing().revealed_code(&user), Some("ABCD2345"));
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_transport_error() {
        let mailer =
            HttpMailer::new("http://127.0.0.1:1/send", Duration::from_millis(500)).unwrap();
        let err = mailer
            .send_activation_email(&pending_user())
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::Transport(_)));
    }
}
