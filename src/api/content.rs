use reqwest::{multipart, Method};
use serde_json::{json, Value};
use std::path::Path;

use crate::api::catalog::{encode_segment, file_part};
use crate::api::client::AdminClient;
use crate::api::orders::Ack;
use crate::api::wire::{decode_list, decode_one};
use crate::domain::content::{Banner, Notice, PushAudience, PushNotification};
use crate::error::AdminResult;
use crate::validation::{validate_push_message, validate_required, ValidationError};

impl AdminClient {
    pub async fn active_banners(&self) -> AdminResult<Vec<Banner>> {
        let body = self.get_json("/banner/active").await?;
        decode_list(body, &["data", "banners"])
    }

    pub async fn add_banner(
        &self,
        title: &str,
        redirect_url: Option<&str>,
        is_active: bool,
        image: &Path,
    ) -> AdminResult<Ack> {
        validate_required("title", title)?;
        let mut form = multipart::Form::new()
            .text("title", title.to_string())
            .text("isActive", is_active.to_string());
        if let Some(url) = redirect_url {
            form = form.text("redirectUrl", url.to_string());
        }
        let form = form.part("image", file_part(image).await?);
        let body = self
            .send_multipart(Method::POST, "/banner/add-banner", form)
            .await?;
        Ok(Ack::from_body(&body))
    }

    pub async fn set_banner_active(&self, banner_id: &str, is_active: bool) -> AdminResult<Ack> {
        let body = self
            .send_json(
                Method::PUT,
                &format!("/banner/{}", encode_segment(banner_id.trim())),
                &json!({ "isActive": is_active }),
            )
            .await?;
        Ok(Ack::from_body(&body))
    }

    pub async fn delete_banner(&self, banner_id: &str) -> AdminResult<Ack> {
        let body = self
            .send_empty(
                Method::DELETE,
                &format!("/banner/{}", encode_segment(banner_id.trim())),
            )
            .await?;
        Ok(Ack::from_body(&body))
    }

    /// The notice currently shown to customers, if any.
    pub async fn active_notice(&self) -> AdminResult<Option<Notice>> {
        let body = self.get_json("/notice/active").await?;
        match body {
            Value::Null => Ok(None),
            body => decode_one(body, &["data", "notice"]).map(Some),
        }
    }

    pub async fn add_notice(&self, notice: &Notice) -> AdminResult<Ack> {
        validate_required("title", &notice.title)?;
        validate_required("message", &notice.message)?;
        let body = self.send_json(Method::POST, "/notice/add", notice).await?;
        Ok(Ack::from_body(&body))
    }

    pub async fn update_notice(&self, notice: &Notice) -> AdminResult<Ack> {
        let id = notice
            .id
            .as_deref()
            .ok_or_else(|| ValidationError::new("id", "notice has no id"))?;
        let body = self
            .send_json(
                Method::PUT,
                &format!("/notice/{}", encode_segment(id.trim())),
                notice,
            )
            .await?;
        Ok(Ack::from_body(&body))
    }

    /// Dispatches a push notification. The backend's delivery summary is
    /// returned untouched.
    pub async fn push(
        &self,
        audience: &PushAudience,
        notification: &PushNotification,
    ) -> AdminResult<Value> {
        validate_push_message(&notification.title, &notification.body)?;
        match audience {
            PushAudience::All => {
                self.send_json(Method::POST, "/push/notify-all", notification)
                    .await
            }
            PushAudience::Users(ids) => {
                if ids.is_empty() {
                    return Err(ValidationError::new("user_ids", "must not be empty").into());
                }
                let mut payload =
                    serde_json::to_value(notification).unwrap_or_else(|_| json!({}));
                payload["userIds"] = json!(ids);
                self.send_json(Method::POST, "/push/notify-users", &payload)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn push_to_users_includes_ids() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/push/notify-users")
            .match_body(Matcher::Json(json!({
                "title": "Sale",
                "body": "Today only",
                "userIds": ["u1", "u2"]
            })))
            .with_status(200)
            .with_body(r#"{"successCount":2}"#)
            .create_async()
            .await;

        let client = AdminClient::new(server.url());
        let result = client
            .push(
                &PushAudience::users_from_csv("u1,u2"),
                &PushNotification::new("Sale", "Today only"),
            )
            .await
            .unwrap();
        assert_eq!(result["successCount"], 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn push_without_body_is_rejected_locally() {
        let client = AdminClient::new("http://127.0.0.1:9");
        let result = client
            .push(&PushAudience::All, &PushNotification::new("Sale", ""))
            .await;
        assert!(matches!(result, Err(crate::error::AdminError::Validation(_))));
    }

    #[tokio::test]
    async fn missing_notice_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/notice/active")
            .with_status(200)
            .with_body("null")
            .create_async()
            .await;

        let client = AdminClient::new(server.url());
        assert!(client.active_notice().await.unwrap().is_none());
    }
}
