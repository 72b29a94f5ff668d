use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Photo payload returned by upload endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoResponse {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Original client-supplied filename.
    pub filename: String,
    pub original_url: String,
    /// Display thumbnail: medium for portfolio/event uploads, large for
    /// slideshow uploads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_small_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_medium_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_large_url: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Size of the uploaded original in bytes.
    pub size: u64,
}

/// Single-file upload response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub photo: PhotoResponse,
}

/// Per-file outcome inside a batch upload. One file's failure never affects
/// its siblings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchItemResult {
    pub filename: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<PhotoResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItemResult {
    pub fn ok(filename: String, photo: PhotoResponse) -> Self {
        Self {
            filename,
            success: true,
            photo: Some(photo),
            error: None,
        }
    }

    pub fn failed(filename: String, error: String) -> Self {
        Self {
            filename,
            success: false,
            photo: None,
            error: Some(error),
        }
    }
}

/// Aggregate counts for a batch upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

/// Batch upload response: per-file results plus summary counts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchUploadResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<BatchItemResult>,
    pub summary: BatchSummary,
}

impl BatchUploadResponse {
    pub fn from_results(results: Vec<BatchItemResult>) -> Self {
        let total = results.len();
        let success = results.iter().filter(|r| r.success).count();
        let failed = total - success;
        let message = if failed > 0 {
            format!("Uploaded {} photos, {} failed", success, failed)
        } else {
            format!("Uploaded {} photos", success)
        };
        Self {
            success: true,
            message,
            results,
            summary: BatchSummary {
                total,
                success,
                failed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_summary_counts() {
        let results = vec![
            BatchItemResult::failed("a.jpg".into(), "bad".into()),
            BatchItemResult::failed("b.jpg".into(), "bad".into()),
        ];
        let resp = BatchUploadResponse::from_results(results);
        assert_eq!(resp.summary.total, 2);
        assert_eq!(resp.summary.success, 0);
        assert_eq!(resp.summary.failed, 2);
        assert!(resp.message.contains("2 failed"));
    }
}
