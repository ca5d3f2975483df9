//! Order domain entity.
//! Canonical representation of a marketplace order, independent of which
//! backend endpoint produced it. Wire shapes are adapted in `api::wire`.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::validation::ValidationError;

/// Known lifecycle states in the order the workflow moves through them,
/// `Cancelled` excluded.
pub const LIFECYCLE: [OrderStatus; 8] = [
    OrderStatus::Pending,
    OrderStatus::Placed,
    OrderStatus::Confirmed,
    OrderStatus::ReadyToCollect,
    OrderStatus::Assigned,
    OrderStatus::PickedUp,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
];

pub const DELIVERY_FEE: i64 = 20;
pub const PLATFORM_FEE: i64 = 5;
/// Deducted from the order total before fees are added back on top.
pub const BASE_DEDUCTION: i64 = 25;

/// Platform commission as a fraction of the subtotal (5 %).
pub fn commission_rate() -> BigDecimal {
    BigDecimal::new(5.into(), 2)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Pending,
    Placed,
    Confirmed,
    ReadyToCollect,
    Assigned,
    PickedUp,
    OutForDelivery,
    Delivered,
    Cancelled,
    /// A status the backend sent that this client does not know.
    Other(String),
}

impl OrderStatus {
    pub fn all() -> Vec<OrderStatus> {
        let mut all = LIFECYCLE.to_vec();
        all.push(OrderStatus::Cancelled);
        all
    }

    pub fn label(&self) -> &str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Placed => "Placed",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::ReadyToCollect => "Ready to Collect",
            OrderStatus::Assigned => "Assigned",
            OrderStatus::PickedUp => "Picked Up",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Other(raw) => raw,
        }
    }

    pub fn parse(raw: &str) -> OrderStatus {
        let normalized = raw
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ");
        match normalized.as_str() {
            "pending" => OrderStatus::Pending,
            "placed" => OrderStatus::Placed,
            "confirmed" => OrderStatus::Confirmed,
            "ready to collect" => OrderStatus::ReadyToCollect,
            "assigned" => OrderStatus::Assigned,
            "picked up" => OrderStatus::PickedUp,
            "out for delivery" => OrderStatus::OutForDelivery,
            "delivered" => OrderStatus::Delivered,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(raw.trim().to_string()),
        }
    }

    /// One of the nine statuses an operator may set.
    pub fn is_known(&self) -> bool {
        !matches!(self, OrderStatus::Other(_))
    }

    /// Parses operator input, refusing anything outside the fixed list.
    pub fn parse_known(raw: &str) -> Result<OrderStatus, ValidationError> {
        match OrderStatus::parse(raw) {
            OrderStatus::Other(other) => Err(ValidationError::new(
                "status",
                format!(
                    "'{}' is not an order status; expected one of: {}",
                    other,
                    OrderStatus::all()
                        .iter()
                        .map(OrderStatus::label)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )),
            known => Ok(known),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    fn rank(&self) -> Option<usize> {
        LIFECYCLE.iter().position(|s| s == self)
    }

    /// Advisory transition table: forward through the lifecycle, or
    /// cancellation from any non-terminal state. Unknown states may move
    /// anywhere because the client cannot reason about them.
    pub fn allowed_next(&self) -> Vec<OrderStatus> {
        if self.is_terminal() {
            return Vec::new();
        }
        match self.rank() {
            Some(rank) => {
                let mut next: Vec<OrderStatus> = LIFECYCLE[rank + 1..].to_vec();
                next.push(OrderStatus::Cancelled);
                next
            }
            None => OrderStatus::all(),
        }
    }

    pub fn can_transition_to(&self, next: &OrderStatus) -> bool {
        self.allowed_next().contains(next)
    }

    pub fn badge(&self) -> BadgeColor {
        match self {
            OrderStatus::Delivered => BadgeColor::Green,
            OrderStatus::Cancelled | OrderStatus::Pending => BadgeColor::Red,
            OrderStatus::Placed => BadgeColor::Yellow,
            OrderStatus::Assigned => BadgeColor::Purple,
            OrderStatus::OutForDelivery => BadgeColor::Amber,
            OrderStatus::Confirmed | OrderStatus::ReadyToCollect | OrderStatus::PickedUp => {
                BadgeColor::Blue
            }
            OrderStatus::Other(_) => BadgeColor::Neutral,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        OrderStatus::parse(&raw)
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.label().to_string()
    }
}

impl FromStr for OrderStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(OrderStatus::parse(s))
    }
}

/// Status selector for listing; `All` is a filter value only, never a state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    pub fn query_value(&self) -> &str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.label(),
        }
    }

    pub fn matches(&self, status: &OrderStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            Ok(StatusFilter::Only(OrderStatus::parse(s)))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Green,
    Red,
    Yellow,
    Purple,
    Amber,
    Blue,
    Neutral,
}

impl BadgeColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeColor::Green => "green",
            BadgeColor::Red => "red",
            BadgeColor::Yellow => "yellow",
            BadgeColor::Purple => "purple",
            BadgeColor::Amber => "amber",
            BadgeColor::Blue => "blue",
            BadgeColor::Neutral => "neutral",
        }
    }

    /// SGR foreground code for terminal rendering.
    pub fn ansi(&self) -> &'static str {
        match self {
            BadgeColor::Green => "32",
            BadgeColor::Red => "31",
            BadgeColor::Yellow => "33",
            BadgeColor::Purple => "35",
            BadgeColor::Amber => "38;5;214",
            BadgeColor::Blue => "34",
            BadgeColor::Neutral => "37",
        }
    }

    pub fn paint(&self, text: &str) -> String {
        format!("\x1b[{}m{}\x1b[0m", self.ansi(), text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Other(String),
}

impl PaymentStatus {
    pub fn parse(raw: &str) -> PaymentStatus {
        match raw.trim().to_ascii_lowercase().as_str() {
            "paid" => PaymentStatus::Paid,
            "unpaid" => PaymentStatus::Unpaid,
            _ => PaymentStatus::Other(raw.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Other(raw) => raw,
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

impl From<String> for PaymentStatus {
    fn from(raw: String) -> Self {
        PaymentStatus::parse(&raw)
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.label().to_string()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    Cod,
    Online,
    Other(String),
}

impl From<String> for PaymentMethod {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cod" => PaymentMethod::Cod,
            "online" => PaymentMethod::Online,
            _ => PaymentMethod::Other(raw.trim().to_string()),
        }
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        method.to_string()
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cod => f.write_str("cod"),
            PaymentMethod::Online => f.write_str("online"),
            PaymentMethod::Other(raw) => f.write_str(raw),
        }
    }
}

/// A customer, shop or delivery partner as referenced from an order. The
/// backend sends either a bare id or a populated sub-document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyRef {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl PartyRef {
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.id.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetails {
    pub house_number: Option<String>,
    pub floor: Option<String>,
    pub building: Option<String>,
    pub landmark: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub recipient_phone_number: Option<String>,
}

impl AddressDetails {
    /// `house, floor, building, landmark, city, state - pincode`, skipping
    /// parts the backend left out.
    pub fn one_line(&self) -> String {
        let parts: Vec<&str> = [
            &self.house_number,
            &self.floor,
            &self.building,
            &self.landmark,
            &self.city,
            &self.state,
        ]
        .iter()
        .filter_map(|p| p.as_deref())
        .filter(|p| !p.trim().is_empty())
        .collect();

        let mut line = parts.join(", ");
        if let Some(pin) = self.pincode.as_deref().filter(|p| !p.is_empty()) {
            line.push_str(" - ");
            line.push_str(pin);
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Option<String>,
    pub name: String,
    /// Free text on some endpoints, a quantity label on others; kept as sent.
    pub description: Option<String>,
    pub quantity: i64,
    pub price: BigDecimal,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "crate::api::wire::WireOrder")]
pub struct Order {
    pub id: String,
    pub customer: Option<PartyRef>,
    pub items: Vec<OrderItem>,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub assigned_to: Option<PartyRef>,
    pub shop_assigned: Option<PartyRef>,
    pub address: Option<String>,
    pub address_details: Option<AddressDetails>,
    pub status_history: Vec<StatusChange>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Shop and partner selection is offered only for freshly placed orders.
    pub fn can_assign(&self) -> bool {
        self.status == OrderStatus::Placed
    }

    pub fn can_mark_paid(&self) -> bool {
        self.status == OrderStatus::Delivered && !self.payment_status.is_paid()
    }

    /// Last six characters of the id, as used on compact cards.
    pub fn short_id(&self) -> &str {
        let start = self.id.len().saturating_sub(6);
        self.id.get(start..).unwrap_or(&self.id)
    }

    pub fn costing(&self) -> Costing {
        Costing::estimate(&self.total_amount)
    }
}

/// Display-only breakdown of an order total. The backend owns the real
/// commission and fee logic; these figures can drift from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Costing {
    pub subtotal: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub platform_fee: BigDecimal,
    pub final_amount: BigDecimal,
    pub commission: BigDecimal,
    pub shop_receives: BigDecimal,
}

impl Costing {
    pub fn estimate(total: &BigDecimal) -> Costing {
        let subtotal = total - BigDecimal::from(BASE_DEDUCTION);
        let delivery_fee = BigDecimal::from(DELIVERY_FEE);
        let platform_fee = BigDecimal::from(PLATFORM_FEE);
        let final_amount = &subtotal + &delivery_fee + &platform_fee;
        let commission = (&subtotal * commission_rate()).round(2).with_scale(2);
        let shop_receives = (&subtotal - &commission).with_scale(2);

        Costing {
            subtotal,
            delivery_fee,
            platform_fee,
            final_amount,
            commission,
            shop_receives,
        }
    }
}

/// Totals over a shop's completed orders, using the same per-order estimate
/// as [`Costing`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettlementSummary {
    pub orders: usize,
    pub gross: BigDecimal,
    pub net: BigDecimal,
    pub commission: BigDecimal,
    pub shop_received: BigDecimal,
}

impl SettlementSummary {
    pub fn over(orders: &[Order]) -> SettlementSummary {
        orders.iter().fold(SettlementSummary::default(), |mut acc, order| {
            let costing = order.costing();
            acc.orders += 1;
            acc.gross += &order.total_amount;
            acc.net += &costing.subtotal;
            acc.commission += &costing.commission;
            acc.shop_received += &costing.shop_receives;
            acc
        })
    }
}
