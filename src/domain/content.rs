use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: Option<String>,
    pub image: Option<String>,
    pub redirect_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    #[serde(alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub message: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_icon() -> String {
    "🔔".to_string()
}

fn default_background() -> String {
    "#fef3c7".to_string()
}

fn default_text_color() -> String {
    "#92400e".to_string()
}

fn default_active() -> bool {
    true
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Notice {
            id: None,
            title: title.into(),
            message: message.into(),
            icon: default_icon(),
            background_color: default_background(),
            text_color: default_text_color(),
            is_active: default_active(),
        }
    }
}

/// Push payload. `image` and `data` are omitted from the body when unset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
}

impl PushNotification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        PushNotification {
            title: title.into(),
            body: body.into(),
            image: None,
            data: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushAudience {
    All,
    Users(Vec<String>),
}

impl PushAudience {
    /// Parses a comma separated id list, dropping blanks.
    pub fn users_from_csv(raw: &str) -> PushAudience {
        PushAudience::Users(
            raw.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_payload_omits_empty_optionals() {
        let push = PushNotification::new("Sale", "Today only");
        let json = serde_json::to_value(&push).unwrap();
        assert_eq!(json, serde_json::json!({"title": "Sale", "body": "Today only"}));
    }

    #[test]
    fn push_payload_keeps_data_pairs() {
        let mut push = PushNotification::new("Sale", "Today only");
        push.image = Some("https://cdn/x.png".into());
        push.data.insert("screen".into(), "offers".into());
        let json = serde_json::to_value(&push).unwrap();
        assert_eq!(json["data"]["screen"], "offers");
        assert_eq!(json["image"], "https://cdn/x.png");
    }

    #[test]
    fn user_ids_are_split_and_trimmed() {
        assert_eq!(
            PushAudience::users_from_csv(" u1, ,u2 ,"),
            PushAudience::Users(vec!["u1".to_string(), "u2".to_string()])
        );
    }

    #[test]
    fn notice_defaults() {
        let notice: Notice =
            serde_json::from_str(r#"{"_id":"N1","title":"Hi","message":"Closed Sunday"}"#).unwrap();
        assert_eq!(notice.icon, "🔔");
        assert!(notice.is_active);
    }
}
