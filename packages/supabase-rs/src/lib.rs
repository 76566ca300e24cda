//! Minimal Supabase REST client.
//!
//! Covers the two APIs the RFI tracker uses: PostgREST row operations
//! (`/rest/v1/{table}`) and the GoTrue auth API (`/auth/v1`). Every call is
//! made with the service role key; no retries are performed.
//!
//! ```rust,ignore
//! let supabase = SupabaseService::new(SupabaseOptions::new(url, key))?;
//! let rows = supabase.from("rfis").eq("project_id", id).order("created_at", false).select().await?;
//! ```

use std::time::Duration;

pub mod error;
pub mod models;

pub use error::{Result, SupabaseError};
pub use models::AuthUser;

use models::{ErrorBody, InviteRequest};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct SupabaseOptions {
    pub url: String,
    pub service_role_key: String,
    pub timeout: Duration,
}

impl SupabaseOptions {
    pub fn new(url: impl Into<String>, service_role_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_role_key: service_role_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SupabaseService {
    options: SupabaseOptions,
    http: Client,
}

impl SupabaseService {
    pub fn new(options: SupabaseOptions) -> Result<Self> {
        if options.url.trim().is_empty() {
            return Err(SupabaseError::Config("Supabase URL is empty".into()));
        }
        if options.service_role_key.trim().is_empty() {
            return Err(SupabaseError::Config("Service role key is empty".into()));
        }

        let http = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| SupabaseError::Config(e.to_string()))?;

        Ok(Self { options, http })
    }

    pub fn base_url(&self) -> &str {
        self.options.url.trim_end_matches('/')
    }

    /// Start a row query against a PostgREST table.
    pub fn from(&self, table: &str) -> TableQuery<'_> {
        TableQuery {
            service: self,
            table: table.to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Send an invitation e-mail and create the auth user.
    ///
    /// `data` is stored as the user's metadata.
    pub async fn invite_user_by_email(&self, email: &str, data: &Value) -> Result<AuthUser> {
        let url = format!("{}/auth/v1/invite", self.base_url());
        debug!(email, "Inviting user");

        let response = self
            .authorized(self.http.post(url))
            .json(&InviteRequest { email, data })
            .send()
            .await?;

        let response = check_status(response).await?;
        response
            .json::<AuthUser>()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))
    }

    /// Resolve the user behind an access token.
    ///
    /// Returns `Ok(None)` when the token is rejected (expired, revoked, malformed).
    pub async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>> {
        let url = format!("{}/auth/v1/user", self.base_url());

        let response = self
            .http
            .get(url)
            .header("apikey", &self.options.service_role_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            debug!(status = %response.status(), "Access token rejected");
            return Ok(None);
        }

        let response = check_status(response).await?;
        let user = response
            .json::<AuthUser>()
            .await
            .map_err(|e| SupabaseError::Parse(e.to_string()))?;
        Ok(Some(user))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.options.service_role_key)
            .bearer_auth(&self.options.service_role_key)
    }
}

/// Builder for a single PostgREST request.
pub struct TableQuery<'a> {
    service: &'a SupabaseService,
    table: String,
    filters: Vec<(String, String)>,
    order: Option<(String, bool)>,
    limit: Option<usize>,
}

impl<'a> TableQuery<'a> {
    /// Add an equality filter (`column=eq.value`).
    pub fn eq(mut self, column: &str, value: impl std::fmt::Display) -> Self {
        self.filters.push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub async fn select(self) -> Result<Vec<Value>> {
        let request = self.request(Method::GET).query(&[("select", "*")]);
        self.rows(request).await
    }

    pub async fn insert(self, row: &Value) -> Result<Vec<Value>> {
        let request = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(row);
        self.rows(request).await
    }

    pub async fn update(self, patch: &Value) -> Result<Vec<Value>> {
        let request = self
            .request(Method::PATCH)
            .header("Prefer", "return=representation")
            .json(patch);
        self.rows(request).await
    }

    pub async fn delete(self) -> Result<Vec<Value>> {
        let request = self
            .request(Method::DELETE)
            .header("Prefer", "return=representation");
        self.rows(request).await
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.service.base_url(), self.table);
        let mut builder = self
            .service
            .authorized(self.service.http.request(method, url))
            .query(&self.filters);

        if let Some((column, ascending)) = &self.order {
            let direction = if *ascending { "asc" } else { "desc" };
            builder = builder.query(&[("order", format!("{}.{}", column, direction))]);
        }
        if let Some(limit) = self.limit {
            builder = builder.query(&[("limit", limit.to_string())]);
        }
        builder
    }

    async fn rows(&self, request: RequestBuilder) -> Result<Vec<Value>> {
        debug!(table = %self.table, filters = self.filters.len(), "PostgREST request");
        let response = check_status(request.send().await?).await?;

        match response.json::<Value>().await {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(Value::Null) => Ok(Vec::new()),
            Ok(other) => Ok(vec![other]),
            Err(e) => Err(SupabaseError::Parse(e.to_string())),
        }
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body
        .message()
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

    warn!(status = status.as_u16(), %message, "Supabase returned an error");
    Err(SupabaseError::Api {
        status: status.as_u16(),
        code: body.code(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_url() {
        let result = SupabaseService::new(SupabaseOptions::new("", "key"));
        assert!(matches!(result, Err(SupabaseError::Config(_))));
    }

    #[test]
    fn test_rejects_empty_key() {
        let result = SupabaseService::new(SupabaseOptions::new("https://x.supabase.co", " "));
        assert!(matches!(result, Err(SupabaseError::Config(_))));
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let service =
            SupabaseService::new(SupabaseOptions::new("https://x.supabase.co/", "key")).unwrap();
        assert_eq!(service.base_url(), "https://x.supabase.co");
    }

    #[test]
    fn test_error_body_prefers_message_then_msg() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"code":"23505","message":"duplicate key"}"#).unwrap();
        assert_eq!(body.code().as_deref(), Some("23505"));
        assert_eq!(body.message().as_deref(), Some("duplicate key"));

        let body: ErrorBody =
            serde_json::from_str(r#"{"code":422,"msg":"Email address is invalid"}"#).unwrap();
        assert_eq!(body.code().as_deref(), Some("422"));
        assert_eq!(body.message().as_deref(), Some("Email address is invalid"));
    }
}
