// HTTP implementation of the TimeTrackingBackend port.
//
// Purpose
// - Talk to the REST backend with session-cookie authentication.
//
// Responsibilities
// - Send `X-App-Type` and `X-Requested-With` on every request so the backend keeps hub and kiosk
//   sessions apart.
// - Map transport failures and non-success statuses onto BackendError.
// - Collapse paginated time-log responses by following `next` links.
//
// Testing guidance
// - Exercised against wiremock in tests/http_backend_tests.rs.

use crate::modules::time_tracking::core::ingest::EntryPage;
use crate::modules::time_tracking::core::time_entry::TimeEntry;
use crate::shared::infrastructure::backend::{BackendError, TimeTrackingBackend, UserProfile};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on followed `next` links, in case a backend keeps pointing at itself.
const MAX_PAGES: usize = 100;

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn builder(base_url: impl Into<String>) -> HttpBackendBuilder {
        HttpBackendBuilder {
            base_url: base_url.into(),
            app_type: "hub".into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolves a pagination link, which may be absolute or relative to the base url.
    fn resolve(&self, link: &str) -> Result<String, BackendError> {
        if Url::parse(link).is_ok() {
            return Ok(link.to_string());
        }
        let base = Url::parse(&self.base_url).map_err(|e| BackendError::Network(e.to_string()))?;
        base.join(link)
            .map(String::from)
            .map_err(|e| BackendError::Decode(format!("invalid next link {link}: {e}")))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Value, BackendError> {
        let request = builder
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending request");

        let response = self
            .client
            .execute(request)
            .await
            .map_err(transport_error)?;
        let status = response.status();
        debug!(%method, %url, %status, "received response");

        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn send_as<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, BackendError> {
        let value = self.send(builder).await?;
        serde_json::from_value(value).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn collect_entries(&self, path: &str) -> Result<Vec<TimeEntry>, BackendError> {
        let mut url = self.endpoint(path);
        let mut entries = Vec::new();
        for _ in 0..MAX_PAGES {
            let page = EntryPage::from_json(self.send(self.client.get(&url)).await?);
            entries.extend(page.entries);
            match page.next {
                Some(next) => url = self.resolve(&next)?,
                None => return Ok(entries),
            }
        }
        warn!(pages = MAX_PAGES, "stopped following time log pagination");
        Ok(entries)
    }
}

pub struct HttpBackendBuilder {
    base_url: String,
    app_type: String,
    timeout: Duration,
}

impl HttpBackendBuilder {
    /// Either `hub` or `clock`.
    pub fn app_type(mut self, app_type: impl Into<String>) -> Self {
        self.app_type = app_type.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpBackend, BackendError> {
        let mut headers = HeaderMap::new();
        let app_type = HeaderValue::from_str(&self.app_type)
            .map_err(|e| BackendError::Network(format!("invalid app type: {e}")))?;
        headers.insert(HeaderName::from_static("x-app-type"), app_type);
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );

        let client = Client::builder()
            .timeout(self.timeout)
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(HttpBackend {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else if err.is_decode() {
        BackendError::Decode(err.to_string())
    } else {
        BackendError::Network(err.to_string())
    }
}

fn status_error(status: StatusCode, body: &str) -> BackendError {
    if status == StatusCode::UNAUTHORIZED {
        return BackendError::Unauthorized;
    }
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "message", "detail"]
                .iter()
                .find_map(|key| value.get(key).and_then(Value::as_str).map(String::from))
        })
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
    BackendError::Status {
        status: status.as_u16(),
        message,
    }
}

#[async_trait::async_trait]
impl TimeTrackingBackend for HttpBackend {
    async fn login(&self, access_code: &str) -> Result<UserProfile, BackendError> {
        let request = self
            .client
            .post(self.endpoint("/login/"))
            .json(&json!({ "access_code": access_code }));
        self.send_as(request).await
    }

    async fn logout(&self) -> Result<(), BackendError> {
        self.send(self.client.post(self.endpoint("/logout/")))
            .await
            .map(|_| ())
    }

    async fn current_user(&self) -> Result<Option<UserProfile>, BackendError> {
        match self.send_as(self.client.get(self.endpoint("/me/"))).await {
            Ok(user) => Ok(Some(user)),
            Err(BackendError::Unauthorized) | Err(BackendError::Status { status: 403, .. }) => {
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }

    async fn clock_in(&self) -> Result<TimeEntry, BackendError> {
        let request = self
            .client
            .request(Method::POST, self.endpoint("/time-logs/clock_in/"));
        self.send_as(request).await
    }

    async fn clock_out(&self) -> Result<TimeEntry, BackendError> {
        let request = self
            .client
            .request(Method::POST, self.endpoint("/time-logs/clock_out/"));
        self.send_as(request).await
    }

    async fn list_time_entries(&self) -> Result<Vec<TimeEntry>, BackendError> {
        self.collect_entries("/time-logs/").await
    }

    async fn member_timesheet(&self, user_id: &str) -> Result<Vec<TimeEntry>, BackendError> {
        self.collect_entries(&format!("/team/{user_id}/member_timesheet/"))
            .await
    }
}
