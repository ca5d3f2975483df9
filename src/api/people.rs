use reqwest::Method;
use serde_json::json;

use crate::api::catalog::encode_segment;
use crate::api::client::AdminClient;
use crate::api::orders::Ack;
use crate::api::wire::{decode_list, decode_one};
use crate::domain::order::Order;
use crate::domain::people::{
    DailyCollection, DeliveryPartner, DeliveryReport, PartnerEarnings, Shop, ShopDailyEarnings,
    User,
};
use crate::error::AdminResult;
use crate::validation::{sanitize_string, validate_required, validate_search_query};

/// Date range and partner for the delivery report. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default)]
pub struct DeliveryReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub partner_id: Option<String>,
}

impl AdminClient {
    pub async fn available_partners(&self) -> AdminResult<Vec<DeliveryPartner>> {
        let body = self.get_json("/delivery/available").await?;
        decode_list(body, &["data"])
    }

    pub async fn all_partners(&self) -> AdminResult<Vec<DeliveryPartner>> {
        let body = self.get_json("/delivery/get-all-delivery-partner").await?;
        decode_list(body, &["data", "partners"])
    }

    pub async fn registered_partners(&self) -> AdminResult<Vec<DeliveryPartner>> {
        let body = self.get_json("/delivery/registered").await?;
        decode_list(body, &["data", "partners"])
    }

    pub async fn search_partners(&self, query: &str) -> AdminResult<Vec<DeliveryPartner>> {
        let query = validate_search_query(query)?;
        let body = self.get_query("/delivery/search", &[("query", &query)]).await?;
        decode_list(body, &["data", "partners"])
    }

    pub async fn completed_by_partner(&self, query: &str) -> AdminResult<Vec<Order>> {
        let query = validate_search_query(query)?;
        let body = self
            .get_query("/delivery/completed-by-partner", &[("query", &query)])
            .await?;
        decode_list(body, &["data", "orders"])
    }

    pub async fn daily_collection(&self) -> AdminResult<Vec<DailyCollection>> {
        let body = self.get_json("/admin/daily-collection").await?;
        decode_list(body, &["data"])
    }

    pub async fn all_time_earnings(&self) -> AdminResult<Vec<PartnerEarnings>> {
        let body = self.get_json("/admin/all-time-earnings").await?;
        decode_list(body, &["data"])
    }

    pub async fn daily_earnings(&self) -> AdminResult<Vec<PartnerEarnings>> {
        let body = self.get_json("/admin/daily-earnings").await?;
        decode_list(body, &["data"])
    }

    pub async fn delivery_report(&self, query: &DeliveryReportQuery) -> AdminResult<DeliveryReport> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(start) = query.start_date.as_deref() {
            params.push(("startDate", start));
        }
        if let Some(end) = query.end_date.as_deref() {
            params.push(("endDate", end));
        }
        if let Some(partner) = query.partner_id.as_deref() {
            params.push(("deliveryPartnerId", partner));
        }
        let body = self.get_query("/admin/report", &params).await?;
        decode_one(body, &["data", "report"])
    }

    pub async fn all_shops(&self) -> AdminResult<Vec<Shop>> {
        let body = self.get_json("/shop/get-all-shops").await?;
        decode_list(body, &["data"])
    }

    pub async fn registered_shops(&self) -> AdminResult<Vec<Shop>> {
        let body = self.get_json("/shop/registered").await?;
        decode_list(body, &["data", "shops"])
    }

    pub async fn search_shops(&self, query: &str) -> AdminResult<Vec<Shop>> {
        let query = validate_search_query(query)?;
        let body = self.get_query("/shop/search", &[("query", &query)]).await?;
        decode_list(body, &["data", "shops"])
    }

    pub async fn completed_by_shop(&self, query: &str) -> AdminResult<Vec<Order>> {
        let query = validate_search_query(query)?;
        let body = self
            .get_query("/shop/completed-by-shop", &[("query", &query)])
            .await?;
        decode_list(body, &["data", "orders"])
    }

    pub async fn shop_daily_earnings(
        &self,
        shop_id: &str,
        date: &str,
    ) -> AdminResult<ShopDailyEarnings> {
        validate_required("shop_id", shop_id)?;
        validate_required("date", date)?;
        let path = format!("/shop/daily-earnings/{}", encode_segment(shop_id.trim()));
        let body = self.get_query(&path, &[("date", date.trim())]).await?;
        decode_one(body, &[])
    }

    /// Approves a shop by its registration email.
    pub async fn approve_shop(&self, email: &str) -> AdminResult<Ack> {
        let email = sanitize_string(email);
        validate_required("email", &email)?;
        let body = self
            .send_json(Method::POST, "/shop/approve", &json!({ "email": email }))
            .await?;
        Ok(Ack::from_body(&body))
    }

    pub async fn all_users(&self) -> AdminResult<Vec<User>> {
        let body = self.get_json("/users/get-all-users").await?;
        decode_list(body, &["data", "users"])
    }

    pub async fn search_users(&self, query: &str) -> AdminResult<Vec<User>> {
        let query = validate_search_query(query)?;
        let body = self.get_query("/users/search", &[("query", &query)]).await?;
        decode_list(body, &["data", "users"])
    }

    pub async fn account_info(&self, query: &str) -> AdminResult<User> {
        let query = validate_search_query(query)?;
        let body = self
            .get_query("/users/account-info", &[("query", &query)])
            .await?;
        decode_one(body, &["user", "data"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    #[tokio::test]
    async fn approve_requires_email() {
        let client = AdminClient::new("http://127.0.0.1:9");
        let result = client.approve_shop("  ").await;
        assert!(matches!(result, Err(crate::error::AdminError::Validation(_))));
    }

    #[tokio::test]
    async fn search_passes_query_parameter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/delivery/search")
            .match_query(mockito::Matcher::UrlEncoded("query".into(), "ravi kumar".into()))
            .with_status(200)
            .with_body(r#"{"data":[{"_id":"P1","name":"Ravi Kumar","phone":"99887"}]}"#)
            .create_async()
            .await;

        let client = AdminClient::new(server.url());
        let partners = client.search_partners(" ravi   kumar ").await.unwrap();
        assert_eq!(partners.len(), 1);
        assert_eq!(partners[0].name, "Ravi Kumar");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn report_sends_only_given_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/admin/report")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("startDate".into(), "2024-03-01".into()),
                mockito::Matcher::UrlEncoded("deliveryPartnerId".into(), "P1".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"data":{"totalOrders":1,"totalEarnings":30,"avgDeliveryTime":28,"orders":[{"_id":"O1","totalAmount":145}]}}"#)
            .create_async()
            .await;

        let client = AdminClient::new(server.url());
        let report = client
            .delivery_report(&DeliveryReportQuery {
                start_date: Some("2024-03-01".into()),
                end_date: None,
                partner_id: Some("P1".into()),
            })
            .await
            .unwrap();
        assert_eq!(report.total_orders, 1);
        assert_eq!(report.orders.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn shop_earnings_read_top_level_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/shop/daily-earnings/S%201")
            .match_query(mockito::Matcher::UrlEncoded("date".into(), "2024-03-01".into()))
            .with_status(200)
            .with_body(r#"{"success":true,"date":"2024-03-01","shopId":"S 1","totalOrders":2,"grossAmount":370,"commissionTotal":16,"shopReceivedTotal":304}"#)
            .create_async()
            .await;

        let client = AdminClient::new(server.url());
        let earnings = client.shop_daily_earnings("S 1", "2024-03-01").await.unwrap();
        assert!(earnings.success);
        assert_eq!(earnings.total_orders, 2);
        assert_eq!(earnings.shop_received_total, BigDecimal::from(304));
        mock.assert_async().await;
    }
}
