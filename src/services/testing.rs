//! In-memory `OrderApi` that records every call it receives.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Mutex;

use crate::api::{Ack, OrderApi};
use crate::domain::order::{Order, OrderStatus, PaymentStatus, StatusFilter};
use crate::error::{AdminError, AdminResult};

#[derive(Default)]
pub struct RecordingApi {
    calls: Mutex<Vec<String>>,
    orders: Mutex<Vec<Order>>,
    fail_on: Option<&'static str>,
}

pub fn order(id: &str, status: &str, payment_status: &str) -> Order {
    serde_json::from_value(json!({
        "_id": id,
        "status": status,
        "paymentStatus": payment_status,
        "paymentMethod": "cod",
        "totalAmount": 145,
        "customerId": {"_id": "C1", "name": "Asha", "phone": "98765"},
        "items": [{"name": "Rice", "quantity": 2, "price": 50}]
    }))
    .unwrap()
}

impl RecordingApi {
    pub fn failing_on(prefix: &'static str) -> Self {
        RecordingApi {
            fail_on: Some(prefix),
            ..Default::default()
        }
    }

    pub fn with_orders(orders: Vec<Order>) -> Self {
        RecordingApi {
            orders: Mutex::new(orders),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_orders(&self, orders: Vec<Order>) {
        *self.orders.lock().unwrap() = orders;
    }

    fn record(&self, prefix: &'static str, call: String) -> AdminResult<Ack> {
        self.calls.lock().unwrap().push(call);
        if self.fail_on == Some(prefix) {
            return Err(AdminError::Server {
                status: StatusCode::BAD_REQUEST,
                message: Some(format!("{} failed", prefix)),
            });
        }
        Ok(Ack {
            message: Some(format!("{} ok", prefix)),
        })
    }
}

#[async_trait]
impl OrderApi for RecordingApi {
    async fn fetch_orders(&self, filter: &StatusFilter) -> AdminResult<Vec<Order>> {
        self.record("fetch", format!("fetch {}", filter.query_value()))?;
        let orders = self.orders.lock().unwrap();
        Ok(orders
            .iter()
            .filter(|o| filter.matches(&o.status))
            .cloned()
            .collect())
    }

    async fn fetch_order(&self, order_id: &str) -> AdminResult<Order> {
        self.record("order", format!("order {}", order_id))?;
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
            .ok_or_else(|| AdminError::NotFound(format!("order {}", order_id)))
    }

    async fn assign_to_shop(&self, order_id: &str, shop_id: &str) -> AdminResult<Ack> {
        self.record("shop", format!("shop {} {}", order_id, shop_id))
    }

    async fn assign_to_partner(
        &self,
        order_id: &str,
        partner_id: &str,
        shop_id: Option<&str>,
    ) -> AdminResult<Ack> {
        self.record(
            "partner",
            format!("partner {} {} {}", order_id, partner_id, shop_id.unwrap_or("-")),
        )
    }

    async fn update_status(&self, order_id: &str, status: &OrderStatus) -> AdminResult<Ack> {
        self.record("status", format!("status {} {}", order_id, status))
    }

    async fn update_payment_status(
        &self,
        order_id: &str,
        payment_status: &PaymentStatus,
    ) -> AdminResult<Ack> {
        self.record("payment", format!("payment {} {}", order_id, payment_status))
    }

    async fn cancel_order(&self, order_id: &str) -> AdminResult<Ack> {
        self.record("cancel", format!("cancel {}", order_id))
    }
}
