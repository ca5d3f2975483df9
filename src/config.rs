use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use url::Url;

use crate::services::orders::TransitionPolicy;

pub const DEFAULT_API_URL: &str = "https://grokart-2.onrender.com/api/v1";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api_url: String,
    pub socket_url: String,
    pub cookie: Option<String>,
    pub timeout_secs: u64,
    pub transition_policy: TransitionPolicy,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        let api_url = env::var("ADMIN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let socket_url = match env::var("ADMIN_SOCKET_URL") {
            Ok(url) => url,
            Err(_) => socket_url_for(&api_url)?,
        };

        Ok(Config {
            socket_url,
            api_url,
            cookie: env::var("ADMIN_COOKIE").ok().filter(|c| !c.trim().is_empty()),
            timeout_secs: env::var("ADMIN_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            transition_policy: env::var("TRANSITION_POLICY")
                .unwrap_or_else(|_| "advisory".to_string())
                .parse()?,
        })
    }

    pub fn with_api_url(api_url: impl Into<String>) -> anyhow::Result<Self> {
        let api_url = api_url.into();
        Ok(Config {
            socket_url: socket_url_for(&api_url)?,
            api_url,
            cookie: None,
            timeout_secs: 30,
            transition_policy: TransitionPolicy::default(),
        })
    }
}

/// Derives the Socket.IO endpoint from the REST base URL: the same origin
/// with the path dropped. The socket client adds `/socket.io/` itself.
pub fn socket_url_for(api_url: &str) -> Result<String> {
    let mut url = Url::parse(api_url)?;
    match url.scheme() {
        "https" | "http" => {}
        other => anyhow::bail!("ADMIN_API_URL must be http or https, got '{}'", other),
    }
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}
