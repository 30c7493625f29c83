use crate::config::AppConfig;
use crate::error::ApiError;
use crate::rules::{self, ActionReply, RuleList, SubmitReply, ToggleReply};
use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, header};
use serde::de::DeserializeOwned;
use std::time::Duration;

const REQUESTED_WITH: &str = "X-Requested-With";
const CSRF_HEADER: &str = "X-CSRFToken";

/// One call per dashboard endpoint. Implementations never retry.
#[allow(async_fn_in_trait)]
pub trait DashboardApi {
    async fn list_rules(&self) -> Result<RuleList, ApiError>;

    /// Posts the serialised rule form to `action` (create or edit path).
    async fn submit_rule(
        &self,
        action: &str,
        fields: &[(String, String)],
        csrf_token: Option<&str>,
    ) -> Result<SubmitReply, ApiError>;

    async fn delete_rule(&self, rule_id: u64, csrf_token: &str) -> Result<ActionReply, ApiError>;

    async fn toggle_rule(&self, rule_id: u64, csrf_token: &str) -> Result<ToggleReply, ApiError>;

    async fn delete_device(&self, device_id: u64, csrf_token: &str)
    -> Result<ActionReply, ApiError>;
}

#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    cookie: Option<String>,
}

impl HttpApi {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cookie: config.cookie.clone(),
        })
    }

    fn request(&self, method: Method, path: &str, csrf_token: Option<&str>) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .header(REQUESTED_WITH, "XMLHttpRequest")
            .header(header::REFERER, format!("{}/", self.base_url));
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(token) = csrf_token {
            builder = builder.header(CSRF_HEADER, token);
        }
        builder
    }

    async fn execute(&self, builder: RequestBuilder, label: &str) -> Result<(u16, String), ApiError> {
        tracing::debug!("{label}");
        let response = builder.send().await.map_err(|err| {
            tracing::error!("{label} failed: {err}");
            ApiError::Transport(err.to_string())
        })?;
        let status = response.status().as_u16();
        tracing::debug!("{label} -> {status}");
        let body = response
            .text()
            .await
            .map_err(|err| ApiError::Transport(format!("Failed to read response body: {err}")))?;
        Ok((status, body))
    }

    /// Non-2xx responses become status errors before the body is looked at.
    async fn checked<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        label: &str,
    ) -> Result<T, ApiError> {
        let (status, body) = self.execute(builder, label).await?;
        if !(200..300).contains(&status) {
            tracing::warn!("{label} rejected with status {status}");
            return Err(ApiError::from_status(status));
        }
        decode(&body)
    }
}

impl DashboardApi for HttpApi {
    async fn list_rules(&self) -> Result<RuleList, ApiError> {
        let builder = self.request(Method::GET, rules::LIST_PATH, None);
        self.checked(builder, &format!("GET {}", rules::LIST_PATH))
            .await
    }

    async fn submit_rule(
        &self,
        action: &str,
        fields: &[(String, String)],
        csrf_token: Option<&str>,
    ) -> Result<SubmitReply, ApiError> {
        let builder = self
            .request(Method::POST, action, csrf_token)
            .form(fields);
        let label = format!("POST {action}");
        // Validation failures arrive as 4xx with a JSON body worth showing.
        let (status, body) = self.execute(builder, &label).await?;
        match decode(&body) {
            Ok(reply) => Ok(reply),
            Err(_) if !(200..300).contains(&status) => Err(ApiError::from_status(status)),
            Err(err) => Err(err),
        }
    }

    async fn delete_rule(&self, rule_id: u64, csrf_token: &str) -> Result<ActionReply, ApiError> {
        let path = rules::delete_path(rule_id);
        let builder = self.request(Method::POST, &path, Some(csrf_token));
        self.checked(builder, &format!("POST {path}")).await
    }

    async fn toggle_rule(&self, rule_id: u64, csrf_token: &str) -> Result<ToggleReply, ApiError> {
        let path = rules::toggle_path(rule_id);
        let builder = self.request(Method::POST, &path, Some(csrf_token));
        self.checked(builder, &format!("POST {path}")).await
    }

    async fn delete_device(
        &self,
        device_id: u64,
        csrf_token: &str,
    ) -> Result<ActionReply, ApiError> {
        let path = rules::device_delete_path(device_id);
        let builder = self
            .request(Method::POST, &path, Some(csrf_token))
            .header(header::CONTENT_TYPE, "application/json");
        self.checked(builder, &format!("POST {path}")).await
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))
}
