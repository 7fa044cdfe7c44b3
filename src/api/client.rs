//! Confluence Cloud REST implementation of the content API.
//!
//! Wraps a shared reqwest client with basic auth and maps the loosely
//! typed wire records onto the closed [`ContentRef`]/[`Attachment`] model.
//! Records missing required fields are logged and skipped at this
//! boundary, never propagated partially.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{ApiError, Attachment, ContentApi, ContentKind, ContentRef};
use crate::config::Credentials;

/// HTTP connect timeout (30 seconds).
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// HTTP read timeout (5 minutes, attachments can be large).
const READ_TIMEOUT_SECS: u64 = 300;

/// Server page size for paginated listings.
const PAGE_LIMIT: usize = 25;

/// REST implementation of [`ContentApi`] for Confluence Cloud.
///
/// Created once per run and shared; the underlying reqwest client pools
/// connections across requests.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    /// Site origin without trailing slash, e.g. `https://corp.atlassian.net`.
    origin: String,
    /// REST root, `{origin}/wiki/rest/api`.
    api_root: String,
    username: String,
    api_token: String,
}

impl RestClient {
    /// Creates a client for the given site with basic-auth credentials.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(base_url: &Url, credentials: &Credentials) -> Self {
        let client = ClientBuilder::new()
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(std::time::Duration::from_secs(READ_TIMEOUT_SECS))
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");

        let origin = base_url.as_str().trim_end_matches('/').to_string();
        let api_root = format!("{origin}/wiki/rest/api");

        Self {
            client,
            origin,
            api_root,
            username: credentials.username.clone(),
            api_token: credentials.api_token.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{path}", self.api_root);
        Url::parse(&raw).map_err(|_| ApiError::invalid_url(raw))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(url = %url, "content API request");
        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.username, Some(&self.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::http_status(url.as_str(), status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::decode(url.as_str(), e))
    }

    /// Drains a paginated `results` listing, `PAGE_LIMIT` records at a time.
    async fn paged_results<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        let mut collected = Vec::new();
        let mut start = 0usize;

        loop {
            let mut url = self.endpoint(path)?;
            {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in query {
                    pairs.append_pair(key, value);
                }
                pairs.append_pair("limit", &PAGE_LIMIT.to_string());
                pairs.append_pair("start", &start.to_string());
            }

            let envelope: ResultsEnvelope<T> = self.get_json(url).await?;
            let batch_len = envelope.results.len();
            collected.extend(envelope.results);

            if batch_len < PAGE_LIMIT {
                return Ok(collected);
            }
            start += PAGE_LIMIT;
        }
    }

    /// Child listings return 404 when the parent has no children of the
    /// requested type; that is an empty listing, not an error.
    async fn child_listing<T: serde::de::DeserializeOwned>(
        &self,
        parent_id: &str,
        child_type: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        let path = format!("/content/{parent_id}/child/{child_type}");
        match self.paged_results(&path, query).await {
            Ok(records) => Ok(records),
            Err(e) if e.is_status(404) => {
                debug!(parent_id, child_type, "child endpoint returned 404, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Resolves an attachment download link against the site origin.
    fn download_url(&self, download_ref: &str) -> String {
        if download_ref.starts_with("http://") || download_ref.starts_with("https://") {
            return download_ref.to_string();
        }
        if download_ref.starts_with("/wiki/") {
            return format!("{}{download_ref}", self.origin);
        }
        format!("{}/wiki{download_ref}", self.origin)
    }
}

#[async_trait]
impl ContentApi for RestClient {
    #[instrument(level = "debug", skip(self))]
    async fn content_info(&self, id: &str) -> Result<ContentRef, ApiError> {
        let url = self.endpoint(&format!("/content/{id}"))?;
        let record: ContentRecord = self.get_json(url).await?;
        record
            .into_ref()
            .ok_or_else(|| ApiError::malformed_record(id, "id/type/title"))
    }

    #[instrument(level = "debug", skip(self))]
    async fn space_info(&self, key: &str) -> Result<ContentRef, ApiError> {
        let url = self.endpoint(&format!("/space/{key}"))?;
        let record: SpaceRecord = self.get_json(url).await?;
        match (record.key, record.name) {
            (Some(space_key), Some(name)) => {
                Ok(ContentRef::new(ContentKind::Space, space_key, name))
            }
            (Some(space_key), None) => Err(ApiError::malformed_record(space_key, "name")),
            _ => Err(ApiError::malformed_record(key, "key")),
        }
    }

    #[instrument(level = "debug", skip(self))]
    async fn child_content(&self, id: &str) -> Result<Vec<ContentRef>, ApiError> {
        // Direct pages first, then subfolders: matches the order the
        // export mirrors on disk.
        let mut children = Vec::new();
        for child_type in ["page", "folder"] {
            let records: Vec<ContentRecord> = self
                .child_listing(id, child_type, &[("expand", "version")])
                .await?;
            children.extend(records.into_iter().filter_map(ContentRecord::into_ref));
        }
        Ok(children)
    }

    #[instrument(level = "debug", skip(self))]
    async fn space_pages(&self, key: &str) -> Result<Vec<ContentRef>, ApiError> {
        let records: Vec<ContentRecord> = self
            .paged_results(
                "/content",
                &[("spaceKey", key), ("type", "page"), ("expand", "version")],
            )
            .await?;
        Ok(records.into_iter().filter_map(ContentRecord::into_ref).collect())
    }

    #[instrument(level = "debug", skip(self))]
    async fn ancestors(&self, id: &str) -> Result<Vec<ContentRef>, ApiError> {
        let mut url = self.endpoint(&format!("/content/{id}"))?;
        url.query_pairs_mut().append_pair("expand", "ancestors");
        let record: ContentRecord = self.get_json(url).await?;
        Ok(record
            .ancestors
            .unwrap_or_default()
            .into_iter()
            .filter_map(ContentRecord::into_ref)
            .collect())
    }

    #[instrument(level = "debug", skip(self))]
    async fn page_body(&self, id: &str) -> Result<String, ApiError> {
        let mut url = self.endpoint(&format!("/content/{id}"))?;
        url.query_pairs_mut()
            .append_pair("expand", "body.view,body.storage");
        let record: ContentRecord = self.get_json(url).await?;

        // Rendered view preferred; storage format as fallback.
        let body = record.body.unwrap_or_default();
        let value = body
            .view
            .and_then(|v| v.value)
            .or_else(|| body.storage.and_then(|s| s.value))
            .unwrap_or_default();
        Ok(value)
    }

    #[instrument(level = "debug", skip(self))]
    async fn attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ApiError> {
        let records: Vec<AttachmentRecord> = self
            .child_listing(page_id, "attachment", &[("expand", "version")])
            .await?;
        Ok(records
            .into_iter()
            .filter_map(AttachmentRecord::into_attachment)
            .collect())
    }

    #[instrument(level = "debug", skip(self, attachment), fields(attachment_id = %attachment.id))]
    async fn fetch_attachment(&self, attachment: &Attachment) -> Result<Vec<u8>, ApiError> {
        let url = self.download_url(&attachment.download_ref);
        debug!(url = %url, filename = %attachment.filename, "downloading attachment");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.api_token))
            .send()
            .await
            .map_err(|e| ApiError::network(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::http_status(&url, status.as_u16()));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ApiError::network(&url, e))?;
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Wire records. Every field is optional at this layer; conversion decides
// what is usable and logs what is not.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned"))]
struct ResultsEnvelope<T> {
    #[serde(default)]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ContentRecord {
    id: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    title: Option<String>,
    ancestors: Option<Vec<ContentRecord>>,
    body: Option<BodyField>,
}

#[derive(Debug, Default, Deserialize)]
struct BodyField {
    view: Option<BodyValue>,
    storage: Option<BodyValue>,
}

#[derive(Debug, Deserialize)]
struct BodyValue {
    value: Option<String>,
}

impl ContentRecord {
    /// Converts a wire record into a closed reference, or logs and
    /// discards it when a required field is missing or the kind is not a
    /// tree node.
    fn into_ref(self) -> Option<ContentRef> {
        let id = match self.id {
            Some(id) if !id.is_empty() => id,
            _ => {
                warn!("skipping content record without id");
                return None;
            }
        };
        let kind = match self.kind.as_deref() {
            Some("page") => ContentKind::Page,
            Some("folder") => ContentKind::Folder,
            other => {
                warn!(id = %id, kind = ?other, "skipping content record with unrecognized kind");
                return None;
            }
        };
        let title = match self.title {
            Some(title) if !title.is_empty() => title,
            _ => {
                warn!(id = %id, "skipping content record without title");
                return None;
            }
        };
        Some(ContentRef { kind, id, title })
    }
}

#[derive(Debug, Deserialize)]
struct SpaceRecord {
    key: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AttachmentRecord {
    id: Option<String>,
    title: Option<String>,
    #[serde(default)]
    extensions: AttachmentExtensions,
    #[serde(rename = "_links", default)]
    links: AttachmentLinks,
}

#[derive(Debug, Default, Deserialize)]
struct AttachmentExtensions {
    #[serde(rename = "fileSize")]
    file_size: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AttachmentLinks {
    download: Option<String>,
}

impl AttachmentRecord {
    fn into_attachment(self) -> Option<Attachment> {
        let id = match self.id {
            Some(id) if !id.is_empty() => id,
            _ => {
                warn!("skipping attachment record without id");
                return None;
            }
        };
        let filename = match self.title {
            Some(title) if !title.is_empty() => title,
            _ => {
                warn!(id = %id, "skipping attachment record without filename");
                return None;
            }
        };
        let download_ref = match self.links.download {
            Some(link) if !link.is_empty() => link,
            _ => {
                warn!(id = %id, filename = %filename, "skipping attachment record without download link");
                return None;
            }
        };
        Some(Attachment {
            id,
            filename,
            size_bytes: self.extensions.file_size.unwrap_or(0),
            download_ref,
        })
    }
}
