//! # Response Envelope
//!
//! The `{success, data, meta}` shape HTTP handlers return. The engine builds
//! the envelope and picks the status code; the web layer only serializes it.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "success": true,
//!   "data": { "materials": [], "summary": { "totalCarbon": 0.0 } },
//!   "meta": {
//!     "source": "cached",
//!     "dataVersion": "1.0.0",
//!     "timestamp": "2025-01-15T10:30:00Z",
//!     "requestId": "5f0c..."
//!   }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{CarbonError, CarbonResult};

/// Origin label for figures computed from pre-cached reference tables
pub const SOURCE_CACHED: &str = "cached";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub source: String,
    pub data_version: String,
    pub timestamp: DateTime<Utc>,
    pub request_id: Uuid,
}

impl ResponseMeta {
    pub fn new(data_version: impl Into<String>) -> Self {
        ResponseMeta {
            source: SOURCE_CACHED.to_string(),
            data_version: data_version.into(),
            timestamp: Utc::now(),
            request_id: Uuid::new_v4(),
        }
    }
}

/// Successful response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: T,
    pub meta: ResponseMeta,
}

/// Failed response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    /// Human-readable message
    pub error: String,
    /// Stable machine-readable code, e.g. `INVALID_INPUT`
    pub code: String,
    pub details: CarbonError,
}

impl From<&CarbonError> for ApiError {
    fn from(e: &CarbonError) -> Self {
        ApiError {
            success: false,
            error: e.to_string(),
            code: e.error_code().to_string(),
            details: e.clone(),
        }
    }
}

/// Either body, tagged with its HTTP status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Ok(ApiEnvelope<T>),
    Err(ApiError),
}

impl<T> ApiResponse<T> {
    /// Wrap an engine result.
    ///
    /// # Example
    ///
    /// ```rust
    /// use carbon_core::envelope::ApiResponse;
    /// use carbon_core::errors::CarbonError;
    ///
    /// let failed: ApiResponse<()> = ApiResponse::from_result(Err(CarbonError::missing_field("unit")), "1.0.0");
    /// assert_eq!(failed.status_code(), 400);
    /// ```
    pub fn from_result(result: CarbonResult<T>, data_version: &str) -> Self {
        match result {
            Ok(data) => ApiResponse::Ok(ApiEnvelope {
                success: true,
                data,
                meta: ResponseMeta::new(data_version),
            }),
            Err(e) => ApiResponse::Err(ApiError::from(&e)),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiResponse::Ok(_) => 200,
            ApiResponse::Err(e) => e.details.status_code(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Ok(_))
    }
}
