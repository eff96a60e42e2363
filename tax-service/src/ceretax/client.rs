//! HTTP client for the CereTax calculation, data and address-validation
//! APIs.
//!
//! Every call is gated on the integration being enabled and a key being
//! configured before any connection is attempted, and every call is logged
//! to the transaction store on a best-effort basis when logging is enabled.

use crate::config::CeretaxSettings;
use crate::models::NewApiTransaction;
use crate::store::TaxStore;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use service_core::error::AppError;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

const API_KEY_HEADER: &str = "x-api-key";

/// Names the business action behind a call for the transaction log.
#[derive(Debug, Clone, Default)]
pub struct LogContext {
    pub name: String,
    pub document_id: Option<Uuid>,
    pub line_id: Option<Uuid>,
}

impl LogContext {
    pub fn new(name: &str) -> Self {
        LogContext {
            name: name.to_string(),
            ..LogContext::default()
        }
    }

    pub fn for_document(name: &str, document_id: Uuid) -> Self {
        LogContext {
            name: name.to_string(),
            document_id: Some(document_id),
            line_id: None,
        }
    }
}

/// Status and body of a completed (2xx) call.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_str(&self.body).map_err(|e| {
            AppError::ApiError {
                status: self.status,
                body: format!("unparseable response body: {e}"),
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct CeretaxClient {
    http: reqwest::Client,
    settings: CeretaxSettings,
}

impl CeretaxClient {
    pub fn new(settings: CeretaxSettings) -> Self {
        CeretaxClient {
            http: reqwest::Client::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &CeretaxSettings {
        &self.settings
    }

    /// POST the calculation request and return the raw body alongside the
    /// parsed response, so callers can archive exactly what came back.
    pub async fn calculate(
        &self,
        store: &dyn TaxStore,
        payload: &Value,
        ctx: LogContext,
    ) -> Result<RawResponse, AppError> {
        let url = format!("{}/sale", self.settings.environment.calculation_base());
        self.send(
            store,
            Method::POST,
            &url,
            Some(payload),
            &[],
            ctx,
            Duration::from_secs(self.settings.timeout_secs),
        )
        .await
    }

    /// GET address validation for the given query parameters.
    pub async fn validate_address(
        &self,
        store: &dyn TaxStore,
        params: &[(&str, String)],
        ctx: LogContext,
    ) -> Result<RawResponse, AppError> {
        let url = format!("{}/validate", self.settings.environment.address_base());
        self.send(
            store,
            Method::GET,
            &url,
            None,
            params,
            ctx,
            Duration::from_secs(self.settings.timeout_secs),
        )
        .await
    }

    /// GET a reference-data listing (PS codes, unit types, ...).
    pub async fn fetch_reference(
        &self,
        store: &dyn TaxStore,
        path: &str,
        ctx: LogContext,
    ) -> Result<Value, AppError> {
        let url = format!("{}/{}", self.settings.environment.data_base(), path);
        let response = self
            .send(
                store,
                Method::GET,
                &url,
                None,
                &[],
                ctx,
                Duration::from_secs(self.settings.timeout_secs),
            )
            .await?;
        response.json()
    }

    /// POST a transaction status update. Uses the longer status timeout.
    pub async fn update_status(
        &self,
        store: &dyn TaxStore,
        payload: &Value,
        ctx: LogContext,
    ) -> Result<RawResponse, AppError> {
        let url = format!("{}/status", self.settings.environment.calculation_base());
        self.send(
            store,
            Method::POST,
            &url,
            Some(payload),
            &[],
            ctx,
            Duration::from_secs(self.settings.status_timeout_secs),
        )
        .await
    }

    fn ensure_configured(&self) -> Result<&str, AppError> {
        if !self.settings.enabled {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "CereTax integration is disabled"
            )));
        }
        self.settings.api_key().ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!("CereTax API key is not configured"))
        })
    }

    #[instrument(skip_all, fields(endpoint = %url, action = %ctx.name))]
    async fn send(
        &self,
        store: &dyn TaxStore,
        method: Method,
        url: &str,
        payload: Option<&Value>,
        query: &[(&str, String)],
        ctx: LogContext,
        timeout: Duration,
    ) -> Result<RawResponse, AppError> {
        let api_key = self.ensure_configured()?;

        let mut request = self
            .http
            .request(method, url)
            .timeout(timeout)
            .header(API_KEY_HEADER, api_key)
            .header(CONTENT_TYPE, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = payload {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            AppError::TransportError(anyhow::anyhow!("request to CereTax failed: {e}"))
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            AppError::TransportError(anyhow::anyhow!("reading CereTax response failed: {e}"))
        })?;
        debug!(status, bytes = body.len(), "ceretax call completed");

        self.log_call(store, &ctx, url, payload, status, &body).await;

        if status >= 400 {
            return Err(AppError::ApiError { status, body });
        }

        Ok(RawResponse { status, body })
    }

    /// Best effort: a failed audit write is logged and swallowed so it never
    /// fails the business call it describes.
    async fn log_call(
        &self,
        store: &dyn TaxStore,
        ctx: &LogContext,
        url: &str,
        payload: Option<&Value>,
        status: u16,
        body: &str,
    ) {
        if !self.settings.logging_enabled {
            return;
        }
        let headers = serde_json::json!({
            API_KEY_HEADER: "***",
            "content-type": "application/json",
        });
        let entry = NewApiTransaction {
            name: ctx.name.clone(),
            endpoint: url.to_string(),
            request_headers: Some(headers.to_string()),
            request_body: payload.map(|p| p.to_string()),
            status_code: Some(i32::from(status)),
            response_body: Some(body.to_string()),
            document_id: ctx.document_id,
            line_id: ctx.line_id,
        };
        if let Err(e) = store.log_transaction(&entry).await {
            warn!(error = %e, action = %ctx.name, "failed to log CereTax transaction");
        }
    }
}
