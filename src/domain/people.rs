//! Delivery partners, shops and customers as the admin directories list them.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPartner {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_available: Option<bool>,
    pub is_approved: Option<bool>,
    pub vehicle_number: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl DeliveryPartner {
    /// `name (phone)` as shown in assignment pickers.
    pub fn picker_label(&self) -> String {
        match &self.phone {
            Some(phone) => format!("{} ({})", self.name, phone),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerEarnings {
    #[serde(alias = "_id", alias = "deliveryPartnerId")]
    pub partner_id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "totalOrders")]
    pub orders: Option<i64>,
    #[serde(alias = "totalEarnings")]
    pub earnings: Option<BigDecimal>,
}

/// Cash a partner collected on delivery today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCollection {
    #[serde(alias = "_id")]
    pub partner_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub total_amount_collected: BigDecimal,
    #[serde(default)]
    pub order_count: i64,
}

impl DailyCollection {
    /// `"3 orders delivered"`, singular for one.
    pub fn orders_text(&self) -> String {
        format!(
            "{} order{} delivered",
            self.order_count,
            if self.order_count > 1 { "s" } else { "" }
        )
    }
}

/// Delivery performance over a date range, optionally for one partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    #[serde(default)]
    pub total_orders: i64,
    #[serde(default)]
    pub total_earnings: BigDecimal,
    /// Minutes from placement to delivery.
    pub avg_delivery_time: Option<BigDecimal>,
    #[serde(default)]
    pub orders: Vec<ReportedOrder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedOrder {
    #[serde(alias = "_id")]
    pub id: String,
    pub placed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub total_amount: Option<BigDecimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_approved: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One shop's settlement for a single day. `success` is false with a
/// `message` when the shop had nothing that day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopDailyEarnings {
    #[serde(default)]
    pub success: bool,
    pub date: Option<String>,
    pub shop_id: Option<String>,
    #[serde(default)]
    pub total_orders: i64,
    #[serde(default)]
    pub gross_amount: BigDecimal,
    #[serde(default)]
    pub commission_total: BigDecimal,
    #[serde(default)]
    pub shop_received_total: BigDecimal,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// A timestamp, or `"N/A"` for accounts that never logged in.
    pub last_login: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partner_picker_label() {
        let partner: DeliveryPartner =
            serde_json::from_str(r#"{"_id":"P1","name":"Ravi","phone":"99887"}"#).unwrap();
        assert_eq!(partner.picker_label(), "Ravi (99887)");
    }

    #[test]
    fn earnings_accept_aggregate_keys() {
        let row: PartnerEarnings = serde_json::from_str(
            r#"{"_id":"P1","name":"Ravi","totalOrders":12,"totalEarnings":360}"#,
        )
        .unwrap();
        assert_eq!(row.partner_id.as_deref(), Some("P1"));
        assert_eq!(row.orders, Some(12));
        assert_eq!(row.earnings, Some(BigDecimal::from(360)));
    }

    #[test]
    fn daily_collection_counts_orders() {
        let row: DailyCollection = serde_json::from_str(
            r#"{"partnerId":"P1","name":"Ravi","phone":"99887","totalAmountCollected":450.5,"orderCount":3}"#,
        )
        .unwrap();
        assert_eq!(row.total_amount_collected.with_scale(2).to_string(), "450.50");
        assert_eq!(row.orders_text(), "3 orders delivered");

        let single = DailyCollection { order_count: 1, ..row };
        assert_eq!(single.orders_text(), "1 order delivered");
    }

    #[test]
    fn report_reads_summary_and_orders() {
        let report: DeliveryReport = serde_json::from_str(
            r#"{"totalOrders":2,"totalEarnings":60,"avgDeliveryTime":32.5,"orders":[
                {"_id":"O1","placedAt":"2024-03-01T10:00:00Z","deliveredAt":"2024-03-01T10:30:00Z","totalAmount":145}
            ]}"#,
        )
        .unwrap();
        assert_eq!(report.total_orders, 2);
        assert_eq!(report.orders[0].id, "O1");
        assert!(report.orders[0].delivered_at.is_some());
    }

    #[test]
    fn shop_earnings_without_data_reports_message() {
        let earnings: ShopDailyEarnings =
            serde_json::from_str(r#"{"success":false,"message":"No orders on this date"}"#)
                .unwrap();
        assert!(!earnings.success);
        assert_eq!(earnings.total_orders, 0);
        assert_eq!(earnings.message.as_deref(), Some("No orders on this date"));
    }
}
