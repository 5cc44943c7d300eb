// ============================================================================
// Notifications - order confirmation and status update mail
// ============================================================================
//
// - message:    MailMessage and the two templates
// - transport:  MailTransport port, spool adapter, circuit breaker wrapper
// - smtp:       SMTP relay adapter
// - dispatcher: best-effort dispatch policy
//
// ============================================================================

pub mod message;
pub mod transport;
pub mod smtp;
pub mod dispatcher;

pub use message::{MailMessage, Template};
pub use transport::{BreakerTransport, MailTransport, SpoolTransport, TransportError};
pub use smtp::{SmtpSettings, SmtpTransport};
pub use dispatcher::{DispatchOutcome, NotificationDispatcher};
