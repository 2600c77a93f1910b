use super::models::{
    ApplyRequest, ApplyResponse, CatalogRequest, CatalogResponse, SlotCatalogEntry,
};
use crate::config::Config;
use crate::error::{catalog_error, submit_error, SlotResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Supplies the slot catalog for a department
#[async_trait]
pub trait CatalogSource: Send + Sync + 'static {
    async fn fetch_catalog(&self, department: &str) -> SlotResult<Vec<SlotCatalogEntry>>;
}

/// Accepts a saved selection as one comma-joined string
#[async_trait]
pub trait SelectionSink: Send + Sync + 'static {
    async fn submit(&self, shifttime: &str) -> SlotResult<()>;
}

fn build_client(config: &Config) -> SlotResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| catalog_error(&format!("Failed to build HTTP client: {}", e)))
}

/// Catalog source backed by the department dropdown endpoint
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: Client,
    url: Url,
}

impl HttpCatalogSource {
    pub fn new(config: &Config) -> SlotResult<Self> {
        Ok(Self {
            client: build_client(config)?,
            url: config.endpoint(&config.catalog_path)?,
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_catalog(&self, department: &str) -> SlotResult<Vec<SlotCatalogEntry>> {
        debug!("Fetching catalog for {} from {}", department, self.url);

        let response = self
            .client
            .post(self.url.clone())
            .json(&CatalogRequest { department })
            .send()
            .await
            .map_err(|e| catalog_error(&format!("Failed to fetch time slots: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(catalog_error(&format!(
                "Failed to fetch time slots: HTTP {} - {}",
                status, error_body
            )));
        }

        let body: CatalogResponse = response
            .json()
            .await
            .map_err(|e| catalog_error(&format!("Failed to parse time slots response: {}", e)))?;

        parse_catalog_response(department, body)
    }
}

/// Turn a catalog response body into entries
pub fn parse_catalog_response(
    department: &str,
    body: CatalogResponse,
) -> SlotResult<Vec<SlotCatalogEntry>> {
    match body {
        CatalogResponse {
            success: true,
            time_slots: Some(slots),
        } => Ok(slots),
        _ => Err(catalog_error(&format!(
            "No time slots available for department {}",
            department
        ))),
    }
}

/// Selection sink backed by the apply endpoint
#[derive(Debug, Clone)]
pub struct HttpSelectionSink {
    client: Client,
    url: Url,
    job_id: String,
    auth_token: Option<String>,
}

impl HttpSelectionSink {
    pub fn new(config: &Config) -> SlotResult<Self> {
        Ok(Self {
            client: build_client(config)?,
            url: config.endpoint(&config.apply_path)?,
            job_id: config.job_id.clone(),
            auth_token: config.auth_token.clone(),
        })
    }
}

#[async_trait]
impl SelectionSink for HttpSelectionSink {
    async fn submit(&self, shifttime: &str) -> SlotResult<()> {
        let mut request = self.client.post(self.url.clone()).json(&ApplyRequest {
            shifttime,
            job_id: &self.job_id,
        });
        if let Some(token) = &self.auth_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| submit_error(&format!("Failed to save time slots: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(submit_error(&format!(
                "Failed to save time slots: HTTP {} - {}",
                status, error_body
            )));
        }

        let body: ApplyResponse = response
            .json()
            .await
            .map_err(|e| submit_error(&format!("Failed to parse apply response: {}", e)))?;
        info!(
            "Applied for job {} with status {}",
            self.job_id,
            body.status.as_deref().unwrap_or("unknown")
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_catalog_response() {
        let body: CatalogResponse = serde_json::from_str(
            r#"{"success": true, "timeSlots": [{"start_time": "1 PM", "end_time": "5 PM", "slot_type": "Weekday"}]}"#,
        )
        .unwrap();
        assert_eq!(parse_catalog_response("Retail", body).unwrap().len(), 1);
    }

    #[test]
    fn test_unsuccessful_catalog_response_is_an_error() {
        let body: CatalogResponse = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(matches!(
            parse_catalog_response("Retail", body),
            Err(Error::CatalogFetch(_))
        ));

        let body: CatalogResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(parse_catalog_response("Retail", body).is_err());
    }
}
