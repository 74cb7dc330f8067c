use std::future::Future;
use std::sync::Arc;

use reqwest::{Client as HttpClient, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use super::auth::ServiceAccountAuth;
use super::error::{SheetsError, SheetsResult};
use super::model::{RawRow, RowUpdate};
use crate::constants::VALUE_INPUT_OPTION;

/// Tabular store holding the article queue.
pub trait SheetStore: Send + Sync {
    /// Reads `range` in row-major order.
    ///
    /// Fails with [`SheetsError::SourceUnavailable`] when the call fails and
    /// [`SheetsError::EmptyDataset`] when no rows come back.
    fn read_rows(&self, range: &str) -> impl Future<Output = SheetsResult<Vec<RawRow>>> + Send;

    /// Overwrites the status..score cells at `address` with value-as-entered semantics.
    fn write_row(
        &self,
        address: &str,
        update: &RowUpdate,
    ) -> impl Future<Output = SheetsResult<()>> + Send;
}

impl<T: SheetStore> SheetStore for Arc<T> {
    fn read_rows(&self, range: &str) -> impl Future<Output = SheetsResult<Vec<RawRow>>> + Send {
        (**self).read_rows(range)
    }

    fn write_row(
        &self,
        address: &str,
        update: &RowUpdate,
    ) -> impl Future<Output = SheetsResult<()>> + Send {
        (**self).write_row(address, update)
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeUpdate<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<Vec<Value>>,
}

/// Google Sheets v4 `spreadsheets.values` client.
#[derive(Debug)]
pub struct GoogleSheetsClient {
    http: HttpClient,
    base_url: String,
    spreadsheet_id: String,
    auth: ServiceAccountAuth,
}

impl GoogleSheetsClient {
    pub fn new(
        http: HttpClient,
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        auth: ServiceAccountAuth,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            spreadsheet_id: spreadsheet_id.into(),
            auth,
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}` with the range percent-encoded as one segment.
    fn values_url(&self, range: &str) -> Result<Url, String> {
        let mut url = Url::parse(&self.base_url).map_err(|e| format!("invalid base URL: {e}"))?;
        url.path_segments_mut()
            .map_err(|_| "base URL cannot carry a path".to_string())?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }
}

fn cell_to_string(cell: Value) -> Option<String> {
    match cell {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl SheetStore for GoogleSheetsClient {
    #[instrument(skip(self), fields(spreadsheet_id = %self.spreadsheet_id))]
    async fn read_rows(&self, range: &str) -> SheetsResult<Vec<RawRow>> {
        let unavailable = |message: String| SheetsError::SourceUnavailable {
            range: range.to_string(),
            message,
        };

        let token = self.auth.access_token().await?;
        let url = self.values_url(range).map_err(unavailable)?;

        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| unavailable(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(unavailable(format!("{status}: {body}")));
        }

        let body: ValueRange = resp
            .json()
            .await
            .map_err(|e| unavailable(format!("invalid response body: {e}")))?;

        if body.values.is_empty() {
            return Err(SheetsError::EmptyDataset {
                range: range.to_string(),
            });
        }

        let rows: Vec<RawRow> = body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();

        debug!(rows = rows.len(), "Read rows");
        Ok(rows)
    }

    #[instrument(skip(self, update), fields(status = %update.status))]
    async fn write_row(&self, address: &str, update: &RowUpdate) -> SheetsResult<()> {
        let rejected = |message: String| SheetsError::WriteRejected {
            range: address.to_string(),
            message,
        };

        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| rejected(e.to_string()))?;
        let url = self.values_url(address).map_err(rejected)?;

        let body = ValueRangeUpdate {
            range: address,
            major_dimension: "ROWS",
            values: vec![update.to_values()],
        };

        let resp = self
            .http
            .put(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", VALUE_INPUT_OPTION)])
            .json(&body)
            .send()
            .await
            .map_err(|e| rejected(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(rejected(format!("{status}: {body}")));
        }

        debug!("Row written");
        Ok(())
    }
}
