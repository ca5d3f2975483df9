use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::catalog::encode_segment;
use crate::api::client::AdminClient;
use crate::api::wire::{decode_list, decode_one, message_of, raw_list};
use crate::domain::order::{Order, OrderStatus, PaymentStatus, StatusFilter};
use crate::error::{AdminError, AdminResult};
use crate::export::ExportFormat;

/// Acknowledgement of a mutation; carries the backend's `message` if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ack {
    pub message: Option<String>,
}

impl Ack {
    pub(crate) fn from_body(body: &Value) -> Self {
        Ack {
            message: message_of(body),
        }
    }

    pub fn message_or(&self, fallback: &str) -> String {
        self.message.clone().unwrap_or_else(|| fallback.to_string())
    }
}

/// Filters shared by the filter and export endpoints. Unset fields are left
/// out of the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<String>,
}

/// The order operations the board and assignment workflow depend on.
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn fetch_orders(&self, filter: &StatusFilter) -> AdminResult<Vec<Order>>;

    async fn fetch_order(&self, order_id: &str) -> AdminResult<Order>;

    async fn assign_to_shop(&self, order_id: &str, shop_id: &str) -> AdminResult<Ack>;

    async fn assign_to_partner(
        &self,
        order_id: &str,
        partner_id: &str,
        shop_id: Option<&str>,
    ) -> AdminResult<Ack>;

    async fn update_status(&self, order_id: &str, status: &OrderStatus) -> AdminResult<Ack>;

    async fn update_payment_status(
        &self,
        order_id: &str,
        payment_status: &PaymentStatus,
    ) -> AdminResult<Ack>;

    async fn cancel_order(&self, order_id: &str) -> AdminResult<Ack>;
}

impl AdminClient {
    /// Every order, most recent first.
    pub async fn all_orders(&self) -> AdminResult<Vec<Order>> {
        let body = self.get_json("/admin/get-orders").await?;
        let mut orders: Vec<Order> = decode_list(body, &["data"])?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    /// Every order exactly as the backend sent it, for full-object exports.
    pub async fn all_orders_raw(&self) -> AdminResult<Vec<Value>> {
        let body = self.get_json("/admin/get-orders").await?;
        raw_list(body, &["data"])
    }

    pub async fn orders_by_status(&self, filter: &StatusFilter) -> AdminResult<Vec<Order>> {
        let body = self
            .get_query("/order/orders-status", &[("status", filter.query_value())])
            .await?;
        decode_list(body, &["orders", "data"])
    }

    pub async fn placed_orders(&self) -> AdminResult<Vec<Order>> {
        let body = self.get_json("/order/placed").await?;
        decode_list(body, &["orders", "data"])
    }

    pub async fn order_by_id(&self, order_id: &str) -> AdminResult<Order> {
        let path = format!("/order/{}", encode_segment(order_id.trim()));
        match self.get_json(&path).await {
            Ok(body) => decode_one(body, &["order", "data"]),
            Err(AdminError::Server { status, .. }) if status == StatusCode::NOT_FOUND => {
                Err(AdminError::NotFound(format!("order {}", order_id)))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn filter_orders(&self, filter: &OrderFilter) -> AdminResult<Vec<Order>> {
        let body = self
            .send_json(Method::POST, "/admin/filter-orders", filter)
            .await?;
        decode_list(body, &["orders", "data"])
    }

    pub async fn search_orders(&self, query: &str) -> AdminResult<Vec<Order>> {
        let query = crate::validation::validate_search_query(query)?;
        let body = self
            .send_json(Method::POST, "/admin/search", &json!({ "query": query }))
            .await?;
        decode_list(body, &["orders", "data"])
    }

    /// Delivered-order timestamps report. Rows use a flattened shape
    /// (`orderId`, `userName`, `deliveryPartner`, `deliveredAt`) rather than
    /// the order document, so they are returned as sent.
    pub async fn delivered_orders(&self) -> AdminResult<Vec<Value>> {
        let body = self.get_json("/admin/delivered-orders").await?;
        raw_list(body, &["data", "orders"])
    }

    pub async fn orders_by_user(&self, query: &str) -> AdminResult<Vec<Order>> {
        let query = crate::validation::validate_search_query(query)?;
        let body = self.get_query("/users/by-user", &[("query", &query)]).await?;
        decode_list(body, &["orders", "data"])
    }

    /// Customer-side cancellation endpoint, as opposed to the admin one used
    /// by [`OrderApi::cancel_order`].
    pub async fn cancel_order_as_customer(&self, order_id: &str) -> AdminResult<Ack> {
        let body = self
            .send_json(Method::POST, "/order/cancel", &json!({ "orderId": order_id }))
            .await?;
        Ok(Ack::from_body(&body))
    }

    /// Asks the backend to render an export file and returns its bytes.
    pub async fn export_orders(
        &self,
        filter: &OrderFilter,
        format: ExportFormat,
    ) -> AdminResult<Vec<u8>> {
        let mut body = serde_json::to_value(filter).map_err(|e| AdminError::Decode(e.to_string()))?;
        if let Value::Object(map) = &mut body {
            map.insert("format".to_string(), Value::String(format.as_str().to_string()));
        }
        self.post_for_bytes("/admin/export-orders", &body).await
    }
}

#[async_trait]
impl OrderApi for AdminClient {
    async fn fetch_orders(&self, filter: &StatusFilter) -> AdminResult<Vec<Order>> {
        self.orders_by_status(filter).await
    }

    async fn fetch_order(&self, order_id: &str) -> AdminResult<Order> {
        self.order_by_id(order_id).await
    }

    async fn assign_to_shop(&self, order_id: &str, shop_id: &str) -> AdminResult<Ack> {
        let body = self
            .send_json(
                Method::POST,
                "/shop/assign-order",
                &json!({ "orderId": order_id, "shopId": shop_id }),
            )
            .await?;
        Ok(Ack::from_body(&body))
    }

    async fn assign_to_partner(
        &self,
        order_id: &str,
        partner_id: &str,
        shop_id: Option<&str>,
    ) -> AdminResult<Ack> {
        let mut payload = json!({ "orderId": order_id, "deliveryPartnerId": partner_id });
        if let Some(shop_id) = shop_id {
            payload["shopId"] = Value::String(shop_id.to_string());
        }
        let body = self
            .send_json(Method::POST, "/delivery/assign-order", &payload)
            .await?;
        Ok(Ack::from_body(&body))
    }

    async fn update_status(&self, order_id: &str, status: &OrderStatus) -> AdminResult<Ack> {
        let path = format!("/order/update-order-status/{}", encode_segment(order_id));
        let body = self
            .send_json(Method::PATCH, &path, &json!({ "status": status.label() }))
            .await?;
        Ok(Ack::from_body(&body))
    }

    async fn update_payment_status(
        &self,
        order_id: &str,
        payment_status: &PaymentStatus,
    ) -> AdminResult<Ack> {
        let body = self
            .send_json(
                Method::PATCH,
                "/admin/update-payment-status",
                &json!({ "orderId": order_id, "paymentStatus": payment_status.label() }),
            )
            .await?;
        Ok(Ack::from_body(&body))
    }

    async fn cancel_order(&self, order_id: &str) -> AdminResult<Ack> {
        let body = self
            .send_json(
                Method::POST,
                "/admin/cancel-order",
                &json!({ "orderId": order_id }),
            )
            .await?;
        Ok(Ack::from_body(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_skips_unset_fields() {
        let filter = OrderFilter {
            status: Some("Delivered".into()),
            min_amount: Some("100".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"status": "Delivered", "minAmount": "100"})
        );
    }

    #[tokio::test]
    async fn order_ids_are_encoded_into_paths() {
        let mut server = mockito::Server::new_async().await;
        let lookup = server
            .mock("GET", "/order/a%2Fb%3Fc")
            .with_status(200)
            .with_body(r#"{"order":{"_id":"a/b?c","status":"Placed"}}"#)
            .create_async()
            .await;
        let patch = server
            .mock("PATCH", "/order/update-order-status/a%2Fb%3Fc")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = AdminClient::new(server.url());
        let order = client.order_by_id("a/b?c").await.unwrap();
        assert_eq!(order.id, "a/b?c");
        client
            .update_status("a/b?c", &OrderStatus::Confirmed)
            .await
            .unwrap();
        lookup.assert_async().await;
        patch.assert_async().await;
    }

    #[tokio::test]
    async fn missing_order_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/order/O404")
            .with_status(404)
            .with_body(r#"{"message":"Order not found"}"#)
            .create_async()
            .await;

        let client = AdminClient::new(server.url());
        let result = client.fetch_order("O404").await;
        assert!(matches!(result, Err(AdminError::NotFound(_))));
    }

    #[test]
    fn ack_falls_back_to_default_text() {
        let ack = Ack::from_body(&json!({"success": true}));
        assert_eq!(ack.message_or("Order cancelled successfully"), "Order cancelled successfully");
        let ack = Ack::from_body(&json!({"message": "Cancelled"}));
        assert_eq!(ack.message_or("ignored"), "Cancelled");
    }
}
