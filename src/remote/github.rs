//! GitHub git-data API client

use crate::error::RemoteError;
use crate::remote::{EntryKind, RemoteClient, RepositoryId, TreeEntry};
use crate::types::BlobHash;
use async_trait::async_trait;
use base64::Engine;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};

/// Public GitHub API endpoint
pub const GITHUB_API_URL: &str = "https://api.github.com";

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Annotated tags pointing at tags pointing at tags… stop following after this many hops.
const MAX_TAG_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct TagResponse {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    sha: String,
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
    #[serde(default)]
    size: Option<u64>,
}

// Helper function to map transport errors to RemoteError
fn map_http_error(error: reqwest::Error) -> RemoteError {
    if error.is_timeout() {
        RemoteError::RequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        RemoteError::RequestFailed(format!("Connection error: {}", error))
    } else {
        RemoteError::Http(error.to_string())
    }
}

fn build_http_client() -> Result<Client, RemoteError> {
    Client::builder()
        .user_agent(concat!("reposync/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| RemoteError::Http(format!("Failed to create HTTP client: {}", e)))
}

/// Client for the GitHub git-data endpoints (refs, tags, trees, blobs)
pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(api_url: Option<String>, token: Option<String>) -> Result<Self, RemoteError> {
        let api_url = api_url
            .unwrap_or_else(|| GITHUB_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            client: build_http_client()?,
            api_url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    fn repo_url(&self, repo: &RepositoryId, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_url, repo.owner, repo.repo, suffix
        )
    }

    /// GET a JSON document. `not_found` builds the error for a 404.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        not_found: impl FnOnce() -> RemoteError,
    ) -> Result<T, RemoteError> {
        trace!(url, "GET");
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(map_http_error)?;
        let response = check_status(response, not_found).await?;
        response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(format!("Failed to parse {}: {}", url, e)))
    }

    async fn peel_tag(
        &self,
        repo: &RepositoryId,
        mut object: GitObject,
    ) -> Result<String, RemoteError> {
        for _ in 0..MAX_TAG_DEPTH {
            if object.kind != "tag" {
                return Ok(object.sha);
            }
            let url = self.repo_url(repo, &format!("git/tags/{}", object.sha));
            let sha = object.sha.clone();
            let tag: TagResponse = self
                .get_json(&url, || RemoteError::NotFound(format!("tag object {}", sha)))
                .await?;
            debug!(tag = %sha, target = %tag.object.sha, "Peeled annotated tag");
            object = tag.object;
        }
        Err(RemoteError::InvalidResponse(format!(
            "tag chain deeper than {} levels",
            MAX_TAG_DEPTH
        )))
    }
}

async fn check_status(
    response: Response,
    not_found: impl FnOnce() -> RemoteError,
) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && response
                .headers()
                .get("x-ratelimit-remaining")
                .map(|v| v.as_bytes() == b"0")
                .unwrap_or(false));

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    Err(match status.as_u16() {
        _ if rate_limited => RemoteError::RateLimited(error_text),
        401 => RemoteError::Unauthorized(error_text),
        404 => not_found(),
        _ => RemoteError::RequestFailed(format!("status {}: {}", status, error_text)),
    })
}

fn entry_kind(kind: &str) -> Result<EntryKind, RemoteError> {
    match kind {
        "blob" => Ok(EntryKind::Blob),
        "tree" => Ok(EntryKind::Tree),
        "commit" => Ok(EntryKind::Commit),
        other => Err(RemoteError::InvalidResponse(format!(
            "unknown tree entry type: {}",
            other
        ))),
    }
}

fn parse_tree(response: TreeResponse) -> Result<Vec<TreeEntry>, RemoteError> {
    if response.truncated {
        return Err(RemoteError::TruncatedTree(response.sha));
    }
    response
        .tree
        .into_iter()
        .map(|item| {
            Ok(TreeEntry {
                kind: entry_kind(&item.kind)?,
                hash: BlobHash::new(item.sha),
                path: item.path,
            })
        })
        .collect()
}

fn decode_blob(hash: &BlobHash, blob: BlobResponse) -> Result<Vec<u8>, RemoteError> {
    let bytes = match blob.encoding.as_str() {
        "base64" => {
            let cleaned: String = blob
                .content
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            base64::engine::general_purpose::STANDARD
                .decode(cleaned)
                .map_err(|e| RemoteError::Decode {
                    hash: hash.clone(),
                    message: e.to_string(),
                })?
        }
        "utf-8" | "utf8" => blob.content.into_bytes(),
        other => {
            return Err(RemoteError::Decode {
                hash: hash.clone(),
                message: format!("unsupported encoding {}", other),
            })
        }
    };

    if let Some(size) = blob.size {
        if bytes.len() as u64 != size {
            return Err(RemoteError::Decode {
                hash: hash.clone(),
                message: format!("expected {} bytes, decoded {}", size, bytes.len()),
            });
        }
    }
    Ok(bytes)
}

#[async_trait]
impl RemoteClient for GitHubClient {
    async fn resolve_ref(
        &self,
        repo: &RepositoryId,
        reference: &str,
    ) -> Result<String, RemoteError> {
        let url = self.repo_url(repo, &format!("git/ref/{}", reference));
        let response: RefResponse = self
            .get_json(&url, || {
                RemoteError::RefNotFound(format!("{} in {}", reference, repo))
            })
            .await?;
        self.peel_tag(repo, response.object).await
    }

    async fn get_tree_recursive(
        &self,
        repo: &RepositoryId,
        revision: &str,
    ) -> Result<Vec<TreeEntry>, RemoteError> {
        let url = self.repo_url(repo, &format!("git/trees/{}?recursive=1", revision));
        let response: TreeResponse = self
            .get_json(&url, || RemoteError::NotFound(format!("tree {}", revision)))
            .await?;
        parse_tree(response)
    }

    async fn get_blob(&self, repo: &RepositoryId, hash: &BlobHash) -> Result<Vec<u8>, RemoteError> {
        let url = self.repo_url(repo, &format!("git/blobs/{}", hash));
        let response: BlobResponse = self
            .get_json(&url, || RemoteError::NotFound(format!("blob {}", hash)))
            .await?;
        decode_blob(hash, response)
    }
}
