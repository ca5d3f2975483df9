//! Legacy backend shapes and their mapping onto the canonical domain types.
//!
//! The same order comes back differently depending on the endpoint: the
//! customer may be an id or a populated document, payment may be a
//! `paymentStatus` string or an `isPaid` flag, amounts may be numbers or
//! strings. Everything is normalized here so the rest of the crate only sees
//! [`Order`].

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

use crate::domain::order::{
    AddressDetails, Order, OrderItem, OrderStatus, PartyRef, PaymentMethod, PaymentStatus,
    StatusChange,
};
use crate::error::{AdminError, AdminResult};

/// Either a bare id or an embedded sub-document. Anything else the backend
/// puts in a reference field is kept as `Unknown` and read as best we can.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireRef {
    Id(String),
    Embedded(WireContact),
    Unknown(Value),
}

/// Mongoose documents carry `_id`, and also `id` when virtuals are on. Both
/// are read so neither collides with the other.
#[derive(Debug, Clone, Deserialize)]
pub struct WireContact {
    #[serde(rename = "_id")]
    pub mongo_id: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Value>,
}

impl WireRef {
    pub fn into_party(self) -> Option<PartyRef> {
        match self {
            WireRef::Id(id) => Some(PartyRef {
                id: Some(id),
                ..Default::default()
            }),
            WireRef::Embedded(c) => Some(PartyRef {
                id: c.mongo_id.or(c.id),
                name: c.name,
                email: c.email,
                phone: c.phone.as_ref().and_then(scalar_text),
            }),
            WireRef::Unknown(Value::Number(n)) => Some(PartyRef {
                id: Some(n.to_string()),
                ..Default::default()
            }),
            WireRef::Unknown(_) => None,
        }
    }
}

/// Reads an absent or `null` list as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireItem {
    pub product_id: Option<WireRef>,
    #[serde(default)]
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<Value>,
    pub price: Option<Value>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireStatusChange {
    pub status: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireOrder {
    #[serde(rename = "_id")]
    pub mongo_id: Option<String>,
    pub id: Option<String>,
    #[serde(alias = "user")]
    pub customer_id: Option<WireRef>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<WireItem>,
    pub total_amount: Option<Value>,
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub payment_status: Option<String>,
    pub is_paid: Option<bool>,
    pub assigned_to: Option<WireRef>,
    pub shop_assigned: Option<WireRef>,
    pub address: Option<String>,
    pub address_details: Option<WireAddress>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status_history: Vec<WireStatusChange>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireAddress {
    pub house_number: Option<Value>,
    pub floor: Option<Value>,
    pub building: Option<String>,
    pub landmark: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<Value>,
    pub recipient_phone_number: Option<Value>,
}

impl From<WireAddress> for AddressDetails {
    fn from(wire: WireAddress) -> Self {
        AddressDetails {
            house_number: wire.house_number.as_ref().and_then(scalar_text),
            floor: wire.floor.as_ref().and_then(scalar_text),
            building: wire.building,
            landmark: wire.landmark,
            city: wire.city,
            state: wire.state,
            pincode: wire.pincode.as_ref().and_then(scalar_text),
            recipient_phone_number: wire.recipient_phone_number.as_ref().and_then(scalar_text),
        }
    }
}

impl From<WireItem> for OrderItem {
    fn from(wire: WireItem) -> Self {
        let product = wire.product_id.and_then(WireRef::into_party);
        let name = wire
            .name
            .or_else(|| product.as_ref().and_then(|p| p.name.clone()))
            .unwrap_or_default();

        OrderItem {
            product_id: product.and_then(|p| p.id),
            name,
            description: wire.description,
            quantity: wire.quantity.as_ref().and_then(integer).unwrap_or(1),
            price: wire.price.as_ref().map(decimal).unwrap_or_default(),
            is_available: wire.is_available,
        }
    }
}

impl TryFrom<WireOrder> for Order {
    type Error = String;

    fn try_from(wire: WireOrder) -> Result<Self, Self::Error> {
        let id = wire
            .mongo_id
            .or(wire.id)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| "order has no _id".to_string())?;
        let payment_status = normalize_payment(wire.payment_status.as_deref(), wire.is_paid);

        Ok(Order {
            id,
            customer: wire.customer_id.and_then(WireRef::into_party),
            items: wire.items.into_iter().map(OrderItem::from).collect(),
            total_amount: wire.total_amount.as_ref().map(decimal).unwrap_or_default(),
            status: wire
                .status
                .as_deref()
                .map(OrderStatus::parse)
                .unwrap_or(OrderStatus::Pending),
            payment_method: wire.payment_method.map(PaymentMethod::from),
            payment_status,
            assigned_to: wire.assigned_to.and_then(WireRef::into_party),
            shop_assigned: wire.shop_assigned.and_then(WireRef::into_party),
            address: wire.address,
            address_details: wire.address_details.map(AddressDetails::from),
            status_history: wire
                .status_history
                .into_iter()
                .filter_map(|h| {
                    Some(StatusChange {
                        status: OrderStatus::parse(h.status.as_deref()?),
                        timestamp: h.timestamp.as_deref().and_then(parse_timestamp),
                    })
                })
                .collect(),
            created_at: wire.created_at.as_deref().and_then(parse_timestamp),
            updated_at: wire.updated_at.as_deref().and_then(parse_timestamp),
        })
    }
}

/// An explicit `paymentStatus` string wins over the `isPaid` flag; with
/// neither present the order counts as unpaid.
pub fn normalize_payment(payment_status: Option<&str>, is_paid: Option<bool>) -> PaymentStatus {
    match (payment_status.filter(|s| !s.trim().is_empty()), is_paid) {
        (Some(raw), _) => PaymentStatus::parse(raw),
        (None, Some(true)) => PaymentStatus::Paid,
        (None, _) => PaymentStatus::Unpaid,
    }
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

pub fn decimal(value: &Value) -> BigDecimal {
    match value {
        Value::Number(n) => BigDecimal::from_str(&n.to_string()).unwrap_or_default(),
        Value::String(s) => BigDecimal::from_str(s.trim()).unwrap_or_default(),
        _ => BigDecimal::default(),
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Pulls a payload out of a response body. Endpoints disagree on the key
/// (`data`, `orders`, `order`, ...), so callers name the ones they accept;
/// a body that is itself the payload is accepted as a last resort.
pub fn unwrap_envelope(body: Value, keys: &[&str]) -> AdminResult<Value> {
    if let Value::Object(mut map) = body {
        for key in keys {
            if let Some(value) = map.remove(*key) {
                return Ok(value);
            }
        }
        return Ok(Value::Object(map));
    }
    Ok(body)
}

/// Drops the `id` virtual when `_id` is present, so DTOs that accept either
/// name do not see both.
fn strip_virtual_id(mut record: Value) -> Value {
    if let Value::Object(map) = &mut record {
        if map.contains_key("_id") {
            map.remove("id");
        }
    }
    record
}

/// Decodes a list payload. `null` counts as an empty list. Records that do
/// not decode are skipped with a warning so one bad row cannot blank a
/// whole listing.
pub fn decode_list<T: DeserializeOwned>(body: Value, keys: &[&str]) -> AdminResult<Vec<T>> {
    match unwrap_envelope(body, keys)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => {
            let total = items.len();
            let decoded: Vec<T> = items
                .into_iter()
                .enumerate()
                .filter_map(|(index, item)| {
                    match serde_json::from_value(strip_virtual_id(item)) {
                        Ok(record) => Some(record),
                        Err(e) => {
                            tracing::warn!("Skipping record {} of {}: {}", index, total, e);
                            None
                        }
                    }
                })
                .collect();
            Ok(decoded)
        }
        other => Err(AdminError::Decode(format!(
            "expected a list under {:?}, got {}",
            keys,
            kind(&other)
        ))),
    }
}

pub fn decode_one<T: DeserializeOwned>(body: Value, keys: &[&str]) -> AdminResult<T> {
    let payload = strip_virtual_id(unwrap_envelope(body, keys)?);
    serde_json::from_value(payload).map_err(|e| AdminError::Decode(e.to_string()))
}

/// Raw rows for exports that dump whatever the backend sent.
pub fn raw_list(body: Value, keys: &[&str]) -> AdminResult<Vec<Value>> {
    match unwrap_envelope(body, keys)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items),
        other => Err(AdminError::Decode(format!(
            "expected a list under {:?}, got {}",
            keys,
            kind(&other)
        ))),
    }
}

pub fn message_of(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn adapts_populated_order() {
        let order: Order = serde_json::from_value(json!({
            "_id": "O1",
            "customerId": {"_id": "C1", "name": "Asha", "phone": "98765"},
            "items": [{
                "productId": "P9",
                "name": "Rice",
                "description": "1 kg",
                "quantity": 2,
                "price": 50,
                "isAvailable": true
            }],
            "totalAmount": 145,
            "status": "Placed",
            "paymentMethod": "cod",
            "paymentStatus": "Unpaid",
            "shopAssigned": {"_id": "S1", "name": "Fresh Mart"},
            "addressDetails": {"houseNumber": 12, "city": "Pune", "pincode": 411001},
            "statusHistory": [{"status": "Placed", "timestamp": "2024-05-01T10:00:00Z"}],
            "createdAt": "2024-05-01T10:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(order.id, "O1");
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.customer.as_ref().unwrap().name.as_deref(), Some("Asha"));
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].price, BigDecimal::from(50));
        assert_eq!(order.items[0].product_id.as_deref(), Some("P9"));
        assert_eq!(order.total_amount, BigDecimal::from(145));
        assert_eq!(order.payment_method, Some(PaymentMethod::Cod));
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.shop_assigned.unwrap().display_name(), Some("Fresh Mart"));
        let address = order.address_details.unwrap();
        assert_eq!(address.house_number.as_deref(), Some("12"));
        assert_eq!(address.pincode.as_deref(), Some("411001"));
        assert_eq!(order.status_history.len(), 1);
        assert!(order.created_at.is_some());
    }

    #[test]
    fn adapts_flat_order_with_is_paid() {
        let order: Order = serde_json::from_value(json!({
            "id": "O2",
            "customerId": "C7",
            "totalAmount": "99.50",
            "status": "Delivered",
            "isPaid": true
        }))
        .unwrap();

        assert_eq!(order.customer.unwrap().id.as_deref(), Some("C7"));
        assert_eq!(order.total_amount, BigDecimal::from_str("99.5").unwrap());
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert!(order.items.is_empty());
    }

    #[test]
    fn payment_status_string_wins_over_flag() {
        assert_eq!(normalize_payment(Some("Unpaid"), Some(true)), PaymentStatus::Unpaid);
        assert_eq!(normalize_payment(None, Some(true)), PaymentStatus::Paid);
        assert_eq!(normalize_payment(Some(""), Some(false)), PaymentStatus::Unpaid);
        assert_eq!(normalize_payment(None, None), PaymentStatus::Unpaid);
    }

    #[test]
    fn unknown_status_is_preserved() {
        let order: Order =
            serde_json::from_value(json!({"_id": "O3", "status": "Refunded"})).unwrap();
        assert_eq!(order.status, OrderStatus::Other("Refunded".to_string()));
    }

    #[test]
    fn item_name_falls_back_to_populated_product() {
        let item: OrderItem = serde_json::from_value::<WireItem>(json!({
            "productId": {"_id": "P1", "name": "Atta"},
            "quantity": "3",
            "price": "40"
        }))
        .map(OrderItem::from)
        .unwrap();
        assert_eq!(item.name, "Atta");
        assert_eq!(item.quantity, 3);
    }

    #[test]
    fn envelope_keys_are_tried_in_order() {
        let body = json!({"message": "ok", "orders": [{"_id": "A"}]});
        let orders: Vec<Order> = decode_list(body, &["data", "orders"]).unwrap();
        assert_eq!(orders.len(), 1);

        let empty: Vec<Order> = decode_list(json!({"data": null}), &["data"]).unwrap();
        assert!(empty.is_empty());

        let bare: Vec<Order> = decode_list(json!([{"_id": "B"}]), &["data"]).unwrap();
        assert_eq!(bare[0].id, "B");
    }

    #[test]
    fn null_lists_read_as_empty() {
        let order: Order = serde_json::from_value(json!({
            "_id": "O4",
            "items": null,
            "statusHistory": null,
            "status": "Placed"
        }))
        .unwrap();
        assert!(order.items.is_empty());
        assert!(order.status_history.is_empty());
    }

    #[test]
    fn id_virtual_alongside_mongo_id() {
        let order: Order =
            serde_json::from_value(json!({"_id": "O1", "id": "O1", "status": "Placed"})).unwrap();
        assert_eq!(order.id, "O1");

        let order: Order = serde_json::from_value(json!({
            "_id": "O2",
            "customerId": {"_id": "C1", "id": "C1", "name": "Asha", "phone": 9876543210u64}
        }))
        .unwrap();
        let customer = order.customer.unwrap();
        assert_eq!(customer.id.as_deref(), Some("C1"));
        assert_eq!(customer.phone.as_deref(), Some("9876543210"));
    }

    #[test]
    fn numeric_customer_reference_becomes_id() {
        let order: Order =
            serde_json::from_value(json!({"_id": "O5", "customerId": 42, "assignedTo": [1]}))
                .unwrap();
        assert_eq!(order.customer.unwrap().id.as_deref(), Some("42"));
        assert!(order.assigned_to.is_none());
    }

    #[test]
    fn user_field_names_the_customer() {
        let order: Order = serde_json::from_value(json!({
            "_id": "O6",
            "user": {"_id": "U1", "name": "Asha", "email": "asha@example.com"},
            "totalAmount": 145
        }))
        .unwrap();
        assert_eq!(order.customer.unwrap().id.as_deref(), Some("U1"));
    }

    #[test]
    fn order_without_id_is_rejected() {
        assert!(serde_json::from_value::<Order>(json!({"status": "Placed"})).is_err());
    }

    #[test]
    fn bad_records_are_skipped_not_fatal() {
        let body = json!({"orders": [
            {"_id": "O1", "status": "Placed"},
            {"status": "Placed"},
            "garbage",
            {"_id": "O2", "id": "O2", "items": null, "customerId": 7}
        ]});
        let orders: Vec<Order> = decode_list(body, &["orders"]).unwrap();
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["O1", "O2"]);
    }

    #[test]
    fn directory_records_tolerate_id_virtual() {
        let body = json!({"data": [{"_id": "S1", "id": "S1", "name": "Fresh Mart"}]});
        let shops: Vec<crate::domain::people::Shop> = decode_list(body, &["data"]).unwrap();
        assert_eq!(shops[0].id, "S1");
    }

    #[test]
    fn non_list_payload_is_a_decode_error() {
        let result: AdminResult<Vec<Order>> = decode_list(json!({"data": "oops"}), &["data"]);
        assert!(matches!(result, Err(AdminError::Decode(_))));
    }

    #[test]
    fn reads_message_field() {
        assert_eq!(
            message_of(&json!({"message": "Order not found"})).as_deref(),
            Some("Order not found")
        );
        assert_eq!(message_of(&json!({"error": "x"})), None);
    }
}
