use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use spdlog::debug;
use thiserror::Error;

use crate::config::ContentStore;
use crate::store::queries;
use crate::store::{NewComment, Post, PostSummary, SlugEntry};

/// One round trip per call, no retry, no caching. A null result on a
/// single-document query is a "no match", not an error; everything else
/// that goes wrong surfaces as a `StoreError`.
pub struct StoreClient {
    http: Client,
    query_url: String,
    mutate_url: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("content store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content store returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("unexpected content store payload: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct QueryEnvelope {
    #[serde(default)]
    result: Value,
}

fn endpoint(cfg: &ContentStore, action: &str) -> String {
    format!(
        "https://{}.{}/v{}/data/{}/{}",
        cfg.project_id,
        cfg.api_host(),
        cfg.api_version(),
        action,
        cfg.dataset
    )
}

impl StoreClient {
    pub fn new(cfg: &ContentStore) -> StoreClient {
        StoreClient {
            http: Client::new(),
            query_url: endpoint(cfg, "query"),
            mutate_url: endpoint(cfg, "mutate"),
        }
    }

    /// All posts with their card fields, in store order.
    pub async fn fetch_posts(&self) -> Result<Vec<PostSummary>, StoreError> {
        let result = self.query_value(queries::ALL_POSTS, &[]).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Identifier and slug of every post.
    pub async fn fetch_slugs(&self) -> Result<Vec<SlugEntry>, StoreError> {
        let result = self.query_value(queries::ALL_SLUGS, &[]).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// One post by slug, approved comments joined in. `Ok(None)` when no
    /// post carries the slug.
    pub async fn fetch_post(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let params = [("slug", serde_json::to_string(slug)?)];
        let result = self.query_value(queries::POST_BY_SLUG, &params).await?;
        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(result)?))
    }

    /// Create an unapproved comment document under its post.
    pub async fn create_comment(&self, comment: &NewComment) -> Result<(), StoreError> {
        let body = comment_mutation(comment);
        let response = self.http.post(&self.mutate_url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        debug!("Stored new comment for post {}", comment.post_id);
        Ok(())
    }

    async fn query_value(
        &self,
        query: &str,
        params: &[(&str, String)],
    ) -> Result<Value, StoreError> {
        let mut request = self.http.get(&self.query_url).query(&[("query", query)]);
        for (name, value) in params {
            request = request.query(&[(format!("${}", name), value)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let envelope: QueryEnvelope = response.json().await?;
        Ok(envelope.result)
    }
}

/// Mutation body creating one comment document, approval unset.
fn comment_mutation(comment: &NewComment) -> Value {
    json!({
        "mutations": [{
            "create": {
                "_type": "comment",
                "post": {
                    "_type": "reference",
                    "_ref": comment.post_id,
                },
                "name": comment.name,
                "email": comment.email,
                "comment": comment.comment,
                "approved": false,
            }
        }]
    })
}
