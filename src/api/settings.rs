use reqwest::Method;
use serde_json::json;

use crate::api::client::AdminClient;
use crate::api::wire::decode_one;
use crate::domain::settings::{AppSettings, FeeChanges, FeeConfig};
use crate::error::AdminResult;
use crate::validation::ValidationError;

impl AdminClient {
    pub async fn settings(&self) -> AdminResult<AppSettings> {
        let body = self.get_json("/setting/").await?;
        decode_one(body, &["data", "settings"])
    }

    /// Turns cash-on-delivery checkout on or off and returns the stored value.
    pub async fn set_cod_enabled(&self, enabled: bool) -> AdminResult<AppSettings> {
        let body = self
            .send_json(Method::PUT, "/setting/", &json!({ "codEnabled": enabled }))
            .await?;
        decode_one(body, &["data", "settings"])
    }

    pub async fn fee_config(&self) -> AdminResult<FeeConfig> {
        let body = self.get_json("/fee").await?;
        decode_one(body, &["data", "fee"])
    }

    pub async fn update_fee_config(&self, fee: &FeeConfig) -> AdminResult<FeeConfig> {
        let body = self.send_json(Method::PUT, "/fee", fee).await?;
        decode_one(body, &["data", "fee"])
    }

    /// Reads the stored fee configuration, applies `changes` and writes the
    /// whole document back.
    pub async fn apply_fee_changes(&self, changes: FeeChanges) -> AdminResult<FeeConfig> {
        if changes.is_empty() {
            return Err(ValidationError::new("fee", "no fee fields given").into());
        }
        let current = self.fee_config().await?;
        self.update_fee_config(&changes.apply_to(current)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn toggles_cod() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/setting/")
            .match_body(mockito::Matcher::Json(json!({"codEnabled": false})))
            .with_status(200)
            .with_body(r#"{"codEnabled":false}"#)
            .create_async()
            .await;

        let client = AdminClient::new(server.url());
        let settings = client.set_cod_enabled(false).await.unwrap();
        assert!(!settings.cod_enabled);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fee_changes_merge_into_stored_config() {
        let mut server = mockito::Server::new_async().await;
        let read = server
            .mock("GET", "/fee")
            .with_status(200)
            .with_body(r#"{"data":{"deliveryCharge":20,"handlingFee":5,"gstPercentage":5,"isActive":true}}"#)
            .create_async()
            .await;
        let write = server
            .mock("PUT", "/fee")
            .match_body(mockito::Matcher::PartialJson(json!({
                "deliveryCharge": "20",
                "handlingFee": "8",
                "isSurgeActive": true,
                "isActive": true
            })))
            .with_status(200)
            .with_body(r#"{"data":{"deliveryCharge":20,"handlingFee":8,"isSurgeActive":true,"isActive":true}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = AdminClient::new(server.url());
        let changes = FeeChanges {
            handling_fee: Some(8.into()),
            is_surge_active: Some(true),
            ..FeeChanges::default()
        };
        let fee = client.apply_fee_changes(changes).await.unwrap();
        assert_eq!(fee.handling_fee, Some(8.into()));
        read.assert_async().await;
        write.assert_async().await;
    }

    #[tokio::test]
    async fn empty_fee_changes_send_nothing() {
        let client = AdminClient::new("http://127.0.0.1:9");
        let result = client.apply_fee_changes(FeeChanges::default()).await;
        assert!(matches!(result, Err(crate::error::AdminError::Validation(_))));
    }
}
