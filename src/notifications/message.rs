use serde::{Deserialize, Serialize};

use crate::domain::order::Order;

// ============================================================================
// Mail Messages - the two order notification templates
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    OrderConfirmation,
    StatusUpdate,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Template::OrderConfirmation => "order_confirmation",
            Template::StatusUpdate => "status_update",
        }
    }

    /// Render this template for `order`. `None` when the order carries no
    /// contact address.
    pub fn render(&self, order: &Order, from: &str) -> Option<MailMessage> {
        let to = order.email.as_deref().map(str::trim).filter(|to| !to.is_empty())?;

        let (subject, text, html) = match self {
            Template::OrderConfirmation => confirmation_body(order),
            Template::StatusUpdate => status_update_body(order),
        };

        Some(MailMessage {
            from: from.to_string(),
            to: to.to_string(),
            subject,
            text,
            html,
        })
    }
}

fn format_amount(amount: f64) -> String {
    format!("{:.2}€", amount)
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn confirmation_body(order: &Order) -> (String, String, String) {
    let tracking = order.tracking_number.as_deref().unwrap_or("");
    let status = order.status.label();
    let amount = format_amount(order.total);

    let subject = format!("Confirmation de commande #{}", order.id);
    let text = format!(
        "Bonjour,\n\nNous confirmons la réception de votre commande #{}.\n\nStatut: {}\nMontant: {}\nSuivi: {}\n\nMerci pour votre confiance.",
        order.id, status, amount, tracking
    );
    let html = format!(
        "<p>Bonjour,</p>\n\
         <p>Nous confirmons la réception de votre commande <strong>#{}</strong>.</p>\n\
         <ul>\n\
         <li><strong>Statut:</strong> {}</li>\n\
         <li><strong>Montant:</strong> {}</li>\n\
         <li><strong>Suivi:</strong> {}</li>\n\
         </ul>\n\
         <p>Merci pour votre confiance.</p>",
        escape_html(&order.id),
        escape_html(status),
        amount,
        escape_html(tracking)
    );

    (subject, text, html)
}

fn status_update_body(order: &Order) -> (String, String, String) {
    let tracking = order.tracking_number.as_deref().unwrap_or("");
    let status = order.status.label();

    let subject = format!("Mise à jour de votre commande #{}: {}", order.id, status);
    let text = format!(
        "Bonjour,\n\nLe statut de votre commande #{} est désormais: {}.\nNuméro de suivi: {}",
        order.id, status, tracking
    );
    let html = format!(
        "<p>Bonjour,</p>\n\
         <p>Le statut de votre commande <strong>#{}</strong> est désormais: <strong>{}</strong>.</p>\n\
         <p><strong>Numéro de suivi:</strong> {}</p>",
        escape_html(&order.id),
        escape_html(status),
        escape_html(tracking)
    );

    (subject, text, html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderItem, OrderStatus};

    fn order(email: Option<&str>) -> Order {
        Order {
            id: "CMD-1".to_string(),
            email: email.map(str::to_string),
            items: vec![OrderItem::new("1", "Widget", 10.0, 2)],
            total: 24.0,
            date: "2025-01-01T00:00:00Z".to_string(),
            status: OrderStatus::Pending,
            tracking_number: Some("TRK-CMD-1".to_string()),
        }
    }

    #[test]
    fn test_confirmation_template() {
        let message = Template::OrderConfirmation
            .render(&order(Some("a@b.com")), "shop@example.com")
            .unwrap();

        assert_eq!(message.from, "shop@example.com");
        assert_eq!(message.to, "a@b.com");
        assert_eq!(message.subject, "Confirmation de commande #CMD-1");
        assert!(message.text.contains("Statut: En attente"));
        assert!(message.text.contains("Montant: 24.00€"));
        assert!(message.text.contains("Suivi: TRK-CMD-1"));
        assert!(message.html.contains("<strong>#CMD-1</strong>"));
    }

    #[test]
    fn test_status_update_template() {
        let shipped = order(Some("a@b.com")).with_status(OrderStatus::Shipped);
        let message = Template::StatusUpdate.render(&shipped, "shop@example.com").unwrap();

        assert_eq!(message.subject, "Mise à jour de votre commande #CMD-1: Expédiée");
        assert!(message.text.contains("est désormais: Expédiée."));
        assert!(message.html.contains("Numéro de suivi:</strong> TRK-CMD-1"));
    }

    #[test]
    fn test_no_recipient_renders_nothing() {
        assert!(Template::OrderConfirmation.render(&order(None), "x@y.z").is_none());
        assert!(Template::StatusUpdate.render(&order(Some("   ")), "x@y.z").is_none());
    }

    #[test]
    fn test_missing_tracking_number_renders_empty() {
        let mut order = order(Some("a@b.com"));
        order.tracking_number = None;
        let message = Template::StatusUpdate.render(&order, "x@y.z").unwrap();
        assert!(message.text.ends_with("Numéro de suivi: "));
    }

    #[test]
    fn test_foreign_status_label_is_shown_verbatim() {
        let cancelled = order(Some("a@b.com")).with_status(OrderStatus::Other("Annulée".to_string()));
        let message = Template::StatusUpdate.render(&cancelled, "x@y.z").unwrap();
        assert_eq!(message.subject, "Mise à jour de votre commande #CMD-1: Annulée");
    }

    #[test]
    fn test_html_body_escapes_values() {
        let mut order = order(Some("a@b.com"));
        order.id = "<b>CMD</b>".to_string();
        let message = Template::OrderConfirmation.render(&order, "x@y.z").unwrap();

        assert!(message.html.contains("&lt;b&gt;CMD&lt;/b&gt;"));
        assert!(!message.html.contains("<b>CMD</b>"));
    }
}
