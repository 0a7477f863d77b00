//! `RevisionBackend` over the dashboard server's HTTP API

use async_trait::async_trait;
use dashrev_history::{
    DiffFormat, DiffPayload, Operation, PageCursor, RestoredDocument, Result, Revision,
    RevisionBackend,
};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::HttpClient;
use crate::config::HttpConfig;
use crate::error::HttpError;

#[derive(Serialize)]
struct RestoreRequest {
    version: u32,
}

/// HTTP implementation of the revision backend port
///
/// Routes:
/// - `GET  api/dashboards/db/{id}/versions?limit=&start=&orderBy=`
/// - `GET  api/dashboards/db/{id}/compare/{min}...{max}/{format}`
/// - `POST api/dashboards/db/{id}/restore` with `{"version": V}`
///
/// An absent or zero document id short-circuits without a request.
pub struct HttpRevisionBackend {
    client: HttpClient,
}

impl HttpRevisionBackend {
    /// Create a backend from configuration
    pub fn new(config: HttpConfig) -> crate::Result<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
        })
    }

    /// Wrap an existing client
    pub fn with_client(client: HttpClient) -> Self {
        Self { client }
    }

    /// Underlying client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }
}

#[async_trait]
impl RevisionBackend for HttpRevisionBackend {
    async fn fetch_revisions(
        &self,
        document_id: Option<i64>,
        cursor: &PageCursor,
    ) -> Result<Vec<Revision>> {
        let Some(id) = document_id.filter(|id| *id != 0) else {
            debug!("No saved document, skipping revision fetch");
            return Ok(Vec::new());
        };

        let query = [
            ("limit", cursor.limit.to_string()),
            ("start", cursor.start.to_string()),
            ("orderBy", cursor.order_by.clone()),
        ];
        self.client
            .get_json(&format!("api/dashboards/db/{id}/versions"), &query)
            .await
            .map_err(|e| e.into_history(Operation::FetchRevisions))
    }

    async fn fetch_diff(
        &self,
        document_id: Option<i64>,
        original: u32,
        new: u32,
        format: &DiffFormat,
    ) -> Result<DiffPayload> {
        let Some(id) = document_id.filter(|id| *id != 0) else {
            debug!("No saved document, skipping diff fetch");
            return Ok(DiffPayload::empty());
        };

        let (min, max) = (original.min(new), original.max(new));
        let body = self
            .client
            .get_text(
                &format!("api/dashboards/db/{id}/compare/{min}...{max}/{format}"),
                &[],
            )
            .await
            .map_err(|e| e.into_history(Operation::FetchDiff))?;

        // markup views come back as plain text
        Ok(match serde_json::from_str::<Value>(&body) {
            Ok(value) => DiffPayload::from(value),
            Err(_) => DiffPayload::from(body),
        })
    }

    async fn restore(
        &self,
        document_id: Option<i64>,
        version: u32,
    ) -> Result<Option<RestoredDocument>> {
        let Some(id) = document_id.filter(|id| *id != 0) else {
            debug!("No saved document, skipping restore");
            return Ok(None);
        };

        let response: Value = self
            .client
            .post_json(
                &format!("api/dashboards/db/{id}/restore"),
                &RestoreRequest { version },
            )
            .await
            .map_err(|e| e.into_history(Operation::Restore))?;

        parse_restored(response).map_err(|e| e.into_history(Operation::Restore))
    }
}

/// Accepts `{"dashboard": {"dashboard": {..}, "meta": {..}}}` or a flat
/// `{"dashboard": {..}, "meta": {..}}`; the version comes from the top level
/// or from the dashboard body.
fn parse_restored(mut response: Value) -> crate::Result<Option<RestoredDocument>> {
    if response.is_null() || response.as_object().is_some_and(|o| o.is_empty()) {
        return Ok(None);
    }

    let top_version = response.get("version").and_then(Value::as_u64);
    let mut outer = response
        .get_mut("dashboard")
        .map(Value::take)
        .ok_or_else(|| HttpError::Decode("restore response has no dashboard".to_string()))?;

    let (dashboard, meta) = match outer.get_mut("dashboard").map(Value::take) {
        Some(inner) => (inner, outer.get_mut("meta").map(Value::take)),
        None => (outer, response.get_mut("meta").map(Value::take)),
    };

    let version = top_version
        .or_else(|| dashboard.get("version").and_then(Value::as_u64))
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| HttpError::Decode("restore response has no version".to_string()))?;

    Ok(Some(RestoredDocument {
        dashboard,
        meta: meta.unwrap_or(Value::Null),
        version,
    }))
}
