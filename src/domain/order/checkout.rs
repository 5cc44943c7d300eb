use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::record::Order;
use super::value_objects::{OrderItem, OrderStatus};

// ============================================================================
// Checkout - turns cart lines into an Order
// ============================================================================

const ORDER_ID_PREFIX: &str = "CMD-";
const DEFAULT_TAX_RATE: f64 = 0.20;

/// A cart line as held by the client-side cart.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        unit_price: f64,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }
}

/// Parses `id:name:unit_price:quantity`. The name may itself contain `:`.
impl std::str::FromStr for CartLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tail = s.rsplitn(3, ':');
        let (Some(quantity), Some(unit_price), Some(head)) = (tail.next(), tail.next(), tail.next())
        else {
            return Err(format!("expected id:name:price:quantity, got {:?}", s));
        };
        let Some((product_id, name)) = head.split_once(':') else {
            return Err(format!("expected id:name:price:quantity, got {:?}", s));
        };

        let unit_price = unit_price
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid price {:?}: {}", unit_price, e))?;
        let quantity = quantity
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid quantity {:?}: {}", quantity, e))?;

        Ok(CartLine::new(product_id.trim(), name.trim(), unit_price, quantity))
    }
}

/// Order identifier: fixed marker followed by the epoch milliseconds.
/// Two checkouts within the same millisecond collide.
pub fn generate_order_id() -> String {
    format!("{}{}", ORDER_ID_PREFIX, Utc::now().timestamp_millis())
}

/// Current time as an ISO 8601 string with millisecond precision.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy)]
pub struct Checkout {
    tax_rate: f64,
}

impl Default for Checkout {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

impl Checkout {
    pub fn with_tax_rate(tax_rate: f64) -> Result<Self, OrderError> {
        if !tax_rate.is_finite() || tax_rate < 0.0 {
            return Err(OrderError::InvalidTaxRate(tax_rate));
        }
        Ok(Self { tax_rate })
    }

    pub fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    pub fn subtotal(&self, lines: &[CartLine]) -> f64 {
        lines
            .iter()
            .map(|line| line.unit_price * f64::from(line.quantity))
            .sum()
    }

    pub fn tax(&self, lines: &[CartLine]) -> f64 {
        round_cents(self.subtotal(lines) * self.tax_rate)
    }

    pub fn total(&self, lines: &[CartLine]) -> f64 {
        round_cents(self.subtotal(lines) * (1.0 + self.tax_rate))
    }

    fn validate(&self, lines: &[CartLine]) -> Result<(), OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyItems);
        }

        for line in lines {
            if line.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    item_id: line.product_id.clone(),
                    quantity: line.quantity,
                });
            }
            if !line.unit_price.is_finite() || line.unit_price <= 0.0 {
                return Err(OrderError::InvalidPrice {
                    item_id: line.product_id.clone(),
                    price: line.unit_price,
                });
            }
        }

        Ok(())
    }

    /// Build a pending order from the cart. The tracking number is left for
    /// the store to derive.
    pub fn place(&self, lines: &[CartLine], email: Option<String>) -> Result<Order, OrderError> {
        self.validate(lines)?;

        let items = lines
            .iter()
            .map(|line| OrderItem::new(&line.product_id, &line.name, line.unit_price, line.quantity))
            .collect();

        let order = Order {
            id: generate_order_id(),
            email: email.filter(|address| !address.trim().is_empty()),
            items,
            total: self.total(lines),
            date: now_iso8601(),
            status: OrderStatus::Pending,
            tracking_number: None,
        };

        tracing::debug!(
            order_id = %order.id,
            line_count = lines.len(),
            total = order.total,
            "Placed order from cart"
        );

        Ok(order)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Vec<CartLine> {
        vec![
            CartLine::new("1", "Widget", 10.0, 2),
            CartLine::new("2", "Gadget", 2.5, 1),
        ]
    }

    #[test]
    fn test_parse_cart_line() {
        let line: CartLine = "p-7:Lampe: modèle XL:49.90:3".parse().unwrap();
        assert_eq!(line, CartLine::new("p-7", "Lampe: modèle XL", 49.90, 3));

        assert!("p-7:Lampe:49.90".parse::<CartLine>().is_err());
        assert!("p-7:Lampe:cheap:1".parse::<CartLine>().is_err());
        assert!("p-7:Lampe:1.0:-1".parse::<CartLine>().is_err());
    }

    #[test]
    fn test_totals_include_tax() {
        let checkout = Checkout::default();
        let lines = cart();

        assert_eq!(checkout.subtotal(&lines), 22.5);
        assert_eq!(checkout.tax(&lines), 4.5);
        assert_eq!(checkout.total(&lines), 27.0);
    }

    #[test]
    fn test_place_builds_pending_order() {
        let order = Checkout::default()
            .place(&cart(), Some("a@b.com".to_string()))
            .unwrap();

        assert!(order.id.starts_with("CMD-"));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, 27.0);
        assert_eq!(order.email.as_deref(), Some("a@b.com"));
        assert!(order.tracking_number.is_none());
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].id, "1");
        assert_eq!(order.items[1].name, "Gadget");
    }

    #[test]
    fn test_place_date_is_iso8601() {
        let order = Checkout::default().place(&cart(), None).unwrap();
        assert!(order.date.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&order.date).is_ok());
    }

    #[test]
    fn test_blank_email_is_dropped() {
        let order = Checkout::default()
            .place(&cart(), Some("  ".to_string()))
            .unwrap();
        assert!(order.email.is_none());
    }

    #[test]
    fn test_empty_cart_rejected() {
        let result = Checkout::default().place(&[], None);
        assert_eq!(result, Err(OrderError::EmptyItems));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let lines = vec![CartLine::new("7", "Bolt", 1.0, 0)];
        let result = Checkout::default().place(&lines, None);
        assert!(matches!(result, Err(OrderError::InvalidQuantity { ref item_id, .. }) if item_id == "7"));
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let lines = vec![CartLine::new("8", "Nut", 0.0, 1)];
        let result = Checkout::default().place(&lines, None);
        assert!(matches!(result, Err(OrderError::InvalidPrice { .. })));
    }

    #[test]
    fn test_negative_tax_rate_rejected() {
        assert!(Checkout::with_tax_rate(-0.1).is_err());
        assert_eq!(Checkout::with_tax_rate(0.055).unwrap().tax_rate(), 0.055);
    }
}
