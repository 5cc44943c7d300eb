use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::message::MailMessage;
use super::transport::{MailTransport, TransportError};

// ============================================================================
// SMTP Transport - authenticated relay
// ============================================================================
//
// Configured from SMTP_HOST / SMTP_PORT / SMTP_USER / SMTP_PASS. Port 465
// uses implicit TLS, any other port STARTTLS. Without host, user and
// password the transport exists but reports NotConfigured on every send.
//
// ============================================================================

pub const DEFAULT_SMTP_PORT: u16 = 587;
const IMPLICIT_TLS_PORT: u16 = 465;

#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_SMTP_PORT,
            user: None,
            pass: None,
        }
    }
}

// Keeps the password out of logs
impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("pass", &self.pass.as_ref().map(|_| "***"))
            .finish()
    }
}

impl SmtpSettings {
    pub fn is_complete(&self) -> bool {
        self.host.is_some() && self.user.is_some() && self.pass.is_some()
    }

    pub fn uses_implicit_tls(&self) -> bool {
        self.port == IMPLICIT_TLS_PORT
    }
}

pub struct SmtpTransport {
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpTransport {
    pub fn new(settings: &SmtpSettings) -> Self {
        let mailer = match (&settings.host, &settings.user, &settings.pass) {
            (Some(host), Some(user), Some(pass)) => {
                let builder = if settings.uses_implicit_tls() {
                    AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                };
                match builder {
                    Ok(builder) => Some(
                        builder
                            .port(settings.port)
                            .credentials(Credentials::new(user.clone(), pass.clone()))
                            .build(),
                    ),
                    Err(e) => {
                        tracing::warn!(host = %host, error = %e, "Invalid SMTP relay, mail disabled");
                        None
                    }
                }
            }
            _ => None,
        };

        Self { mailer }
    }

    pub fn is_configured(&self) -> bool {
        self.mailer.is_some()
    }
}

fn build_message(message: &MailMessage) -> Result<Message, TransportError> {
    let from: Mailbox = message
        .from
        .parse()
        .map_err(|e| TransportError::Rejected(format!("invalid sender {:?}: {}", message.from, e)))?;
    let to: Mailbox = message
        .to
        .parse()
        .map_err(|e| TransportError::Rejected(format!("invalid recipient {:?}: {}", message.to, e)))?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            message.text.clone(),
            message.html.clone(),
        ))
        .map_err(|e| TransportError::Rejected(e.to_string()))
}

#[async_trait]
impl MailTransport for SmtpTransport {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, message: &MailMessage) -> Result<(), TransportError> {
        let Some(mailer) = &self.mailer else {
            return Err(TransportError::NotConfigured);
        };

        let email = build_message(message)?;
        match mailer.send(email).await {
            Ok(response) => {
                tracing::debug!(to = %message.to, code = %response.code(), "SMTP relay accepted message");
                Ok(())
            }
            Err(e) if e.is_permanent() => Err(TransportError::Rejected(e.to_string())),
            Err(e) => Err(TransportError::Unavailable(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(port: u16) -> SmtpSettings {
        SmtpSettings {
            host: Some("smtp.example.com".to_string()),
            port,
            user: Some("shop".to_string()),
            pass: Some("secret".to_string()),
        }
    }

    fn message(to: &str) -> MailMessage {
        MailMessage {
            from: "no-reply@importpro.fr".to_string(),
            to: to.to_string(),
            subject: "Confirmation de commande #CMD-1".to_string(),
            text: "Bonjour".to_string(),
            html: "<p>Bonjour</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_credentials_is_not_configured() {
        for settings in [
            SmtpSettings::default(),
            SmtpSettings { pass: None, ..complete(587) },
            SmtpSettings { user: None, ..complete(587) },
            SmtpSettings { host: None, ..complete(587) },
        ] {
            let transport = SmtpTransport::new(&settings);
            assert!(!transport.is_configured());
            assert!(matches!(
                transport.send(&message("a@b.com")).await,
                Err(TransportError::NotConfigured)
            ));
        }
    }

    #[tokio::test]
    async fn test_complete_settings_build_a_relay() {
        assert!(SmtpTransport::new(&complete(587)).is_configured());
        assert!(SmtpTransport::new(&complete(465)).is_configured());
    }

    #[test]
    fn test_implicit_tls_only_on_465() {
        assert!(complete(465).uses_implicit_tls());
        assert!(!complete(587).uses_implicit_tls());
        assert!(!complete(25).uses_implicit_tls());
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_rejected_before_connecting() {
        let transport = SmtpTransport::new(&complete(587));
        let result = transport.send(&message("not an address")).await;
        assert!(matches!(result, Err(TransportError::Rejected(_))));
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", complete(587));
        assert!(!rendered.contains("secret"));
    }
}
