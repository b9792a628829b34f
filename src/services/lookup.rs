//! Remote catalogue lookup against the Frappe library API

use std::time::Duration;

use serde::Deserialize;

use crate::{
    config::LookupConfig,
    error::{AppError, AppResult},
    models::RemoteBook,
};

/// Envelope the Frappe API wraps every response in.
#[derive(Debug, Deserialize)]
struct LookupEnvelope {
    #[serde(default)]
    message: Vec<RemoteBook>,
}

#[derive(Clone)]
pub struct LookupService {
    client: reqwest::Client,
    base_url: String,
}

impl LookupService {
    pub fn new(config: &LookupConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Query the remote catalogue. Only non-empty filters are forwarded;
    /// a failed or malformed response surfaces as an invalid operation
    /// rather than a server fault.
    pub async fn search(
        &self,
        title: Option<&str>,
        authors: Option<&str>,
        isbn: Option<&str>,
        publisher: Option<&str>,
        page: i64,
    ) -> AppResult<Vec<RemoteBook>> {
        let mut params: Vec<(&str, String)> = vec![("page", page.to_string())];
        for (key, value) in [
            ("title", title),
            ("authors", authors),
            ("isbn", isbn),
            ("publisher", publisher),
        ] {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                params.push((key, value.to_string()));
            }
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Book lookup request failed: {}", e);
                AppError::InvalidOperation("Book lookup failed".to_string())
            })?;

        if !response.status().is_success() {
            tracing::warn!("Book lookup returned status {}", response.status());
            return Err(AppError::InvalidOperation("Book lookup failed".to_string()));
        }

        let envelope: LookupEnvelope = response.json().await.map_err(|e| {
            tracing::warn!("Book lookup returned malformed body: {}", e);
            AppError::InvalidOperation("Book lookup failed".to_string())
        })?;

        Ok(envelope.message)
    }
}
