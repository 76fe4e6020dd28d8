//! REST refetch seam.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

use hirewire_shared::event::JobRecord;

use super::board::{AdminStats, AppliedJob};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },
}

/// Source of authoritative state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>, SnapshotError>;

    /// Applications of the user the source is authenticated as
    async fn fetch_applied_jobs(&self) -> Result<Vec<AppliedJob>, SnapshotError>;

    async fn fetch_admin_stats(&self) -> Result<AdminStats, SnapshotError>;
}

/// List endpoints answer with a bare array or an object wrapping one.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "jobs", alias = "appliedJobs")]
        data: Vec<T>,
    },
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Bare(items) => items,
            ListBody::Wrapped { data } => data,
        }
    }
}

/// `SnapshotSource` over the job portal's REST API
pub struct HttpSnapshotSource {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl fmt::Debug for HttpSnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSnapshotSource")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpSnapshotSource {
    /// `base_url` is the API origin, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SnapshotError> {
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SnapshotError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch_jobs(&self) -> Result<Vec<JobRecord>, SnapshotError> {
        Ok(self.get::<ListBody<JobRecord>>("/api/jobs").await?.into_vec())
    }

    async fn fetch_applied_jobs(&self) -> Result<Vec<AppliedJob>, SnapshotError> {
        Ok(self
            .get::<ListBody<AppliedJob>>("/api/users/applied-jobs")
            .await?
            .into_vec())
    }

    async fn fetch_admin_stats(&self) -> Result<AdminStats, SnapshotError> {
        self.get("/api/admin/stats").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_body_accepts_bare_and_wrapped_arrays() {
        // テスト項目: 配列そのもの、またはオブジェクトで包まれた配列のどちらも受け付ける
        // given (前提条件):
        let bare = json!([{"_id": "j1", "title": "SRE", "companyName": "Acme"}]);
        let wrapped = json!({"jobs": [{"_id": "j2", "title": "SRE", "companyName": "Acme"}]});

        // when (操作):
        let bare: ListBody<JobRecord> = serde_json::from_value(bare).unwrap();
        let wrapped: ListBody<JobRecord> = serde_json::from_value(wrapped).unwrap();

        // then (期待する結果):
        assert_eq!(bare.into_vec()[0].id, "j1");
        assert_eq!(wrapped.into_vec()[0].id, "j2");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        // テスト項目: ベース URL 末尾のスラッシュは取り除いてパスを連結する
        // given (前提条件):
        let source = HttpSnapshotSource::new("http://127.0.0.1:5000/", "token");

        // when (操作):
        let url = source.url("/api/jobs");

        // then (期待する結果):
        assert_eq!(url, "http://127.0.0.1:5000/api/jobs");
    }

    #[tokio::test]
    async fn test_unreachable_api_is_request_error() {
        // テスト項目: API に接続できない場合は Request エラーになる
        // given (前提条件):
        let source = HttpSnapshotSource::new("http://127.0.0.1:1", "token");

        // when (操作):
        let result = source.fetch_jobs().await;

        // then (期待する結果):
        assert!(matches!(result, Err(SnapshotError::Request(_))));
    }
}
