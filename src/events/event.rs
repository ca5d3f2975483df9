use rust_socketio::Payload;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Socket.IO event the backend emits once per placed order.
pub const NEW_ORDER_EVENT: &str = "new-order";

/// Payload of a `new-order` event. Only `type` is relied on; everything else
/// the backend sends is kept in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderEvent {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl NewOrderEvent {
    pub fn headline(&self) -> String {
        let kind = if self.kind.is_empty() {
            "NEW"
        } else {
            self.kind.as_str()
        };
        format!("New {} order placed!", kind.to_uppercase())
    }

    pub fn order_id(&self) -> Option<&str> {
        ["orderId", "_id", "id"]
            .iter()
            .find_map(|key| self.details.get(*key).and_then(Value::as_str))
    }

    /// Reads the first argument of a `new-order` emit. An emit without
    /// arguments still counts as an order; a non-object argument does not.
    pub fn from_payload(payload: &Payload) -> Option<NewOrderEvent> {
        let first = match payload {
            Payload::Text(values) => values.first().cloned(),
            _ => return None,
        };
        match first {
            None | Some(Value::Null) => Some(NewOrderEvent {
                kind: String::new(),
                details: Map::new(),
            }),
            Some(value) => match serde_json::from_value(value) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!("Ignoring malformed new-order payload: {}", e);
                    None
                }
            },
        }
    }
}
