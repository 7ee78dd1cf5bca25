use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::flex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
        }
    }

    pub fn parse(s: &str) -> Option<Direction> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Some(Direction::Buy),
            "sell" => Some(Direction::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Direction {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(de)?;
        Ok(v.as_str().and_then(Direction::parse).unwrap_or_default())
    }
}

/// Server-side order / transaction status.
///
/// The server owns every transition; this type only names what it reported.
/// Anything outside the known set is kept verbatim in `Unrecognized` so the
/// views can show it without pretending it is one of the known states.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    AwaitingConfirmation,
    Completed,
    Paid,
    Succeeded,
    Failed,
    Expired,
    Cancelled,
    Unrecognized(String),
}

impl OrderStatus {
    /// Case-insensitive, surrounding whitespace ignored. Never fails.
    pub fn parse(raw: &str) -> OrderStatus {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => OrderStatus::Pending,
            "awaiting_confirmation" => OrderStatus::AwaitingConfirmation,
            "completed" => OrderStatus::Completed,
            "paid" => OrderStatus::Paid,
            "succeeded" => OrderStatus::Succeeded,
            "failed" => OrderStatus::Failed,
            "expired" => OrderStatus::Expired,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Unrecognized(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::AwaitingConfirmation => "awaiting_confirmation",
            OrderStatus::Completed => "completed",
            OrderStatus::Paid => "paid",
            OrderStatus::Succeeded => "succeeded",
            OrderStatus::Failed => "failed",
            OrderStatus::Expired => "expired",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unrecognized(s) => s.as_str(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            OrderStatus::AwaitingConfirmation => "Awaiting confirmation".to_string(),
            OrderStatus::Unrecognized(s) if s.is_empty() => "Unknown".to_string(),
            other => {
                let s = other.as_str().replace('_', " ");
                let mut chars = s.chars();
                match chars.next() {
                    Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            }
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Unrecognized(String::new())
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let v = Value::deserialize(de)?;
        Ok(v.as_str().map(OrderStatus::parse).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, deserialize_with = "flex::string_or_number")]
    pub id: String,

    #[serde(default, rename = "order_type")]
    pub direction: Direction,

    #[serde(default)]
    pub status: OrderStatus,

    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    pub amount: f64,

    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    pub fee: f64,

    #[serde(default, deserialize_with = "flex::f64_or_zero")]
    pub total_amount: f64,

    #[serde(default)]
    pub currency: String,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub provider: Option<String>,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub payout_details: Option<String>,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub payment_proof: Option<String>,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub txid: Option<String>,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub created_at: Option<String>,
}

/// Body for `POST /orders/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    #[serde(rename = "order_type")]
    pub direction: Direction,
    pub amount: f64,
    pub currency: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout_details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(OrderStatus::parse("AWAITING_CONFIRMATION"), OrderStatus::AwaitingConfirmation);
        assert_eq!(OrderStatus::parse("  Completed "), OrderStatus::Completed);
        assert_eq!(
            OrderStatus::parse("on_hold"),
            OrderStatus::Unrecognized("on_hold".to_string())
        );
    }

    #[test]
    fn order_tolerates_missing_and_extra_fields() {
        let raw = r#"{
            "id": 17,
            "order_type": "SELL",
            "status": "Pending",
            "amount": "0.0100",
            "total_amount": 0.0102,
            "something_new": {"nested": true}
        }"#;

        let o: Order = serde_json::from_str(raw).unwrap();
        assert_eq!(o.id, "17");
        assert_eq!(o.direction, Direction::Sell);
        assert_eq!(o.status, OrderStatus::Pending);
        assert_eq!(o.amount, 0.01);
        assert_eq!(o.fee, 0.0);
        assert!(o.txid.is_none());
    }

    #[test]
    fn null_status_becomes_unrecognized() {
        let o: Order = serde_json::from_str(r#"{"id":"a","status":null}"#).unwrap();
        assert_eq!(o.status, OrderStatus::Unrecognized(String::new()));
        assert_eq!(o.status.label(), "Unknown");
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(OrderStatus::AwaitingConfirmation.label(), "Awaiting confirmation");
        assert_eq!(OrderStatus::Cancelled.label(), "Cancelled");
    }
}
