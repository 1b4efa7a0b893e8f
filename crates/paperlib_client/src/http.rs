//! Reqwest-based implementation of [`LibraryApi`].

use crate::api::{LibraryApi, PaperUpload};
use async_trait::async_trait;
use paperlib_core::{
    config::normalize_server_url,
    models::{
        Folder, FolderPayload, FoldersResponse, LibraryStats, MetadataUpdate, Paper,
        PapersResponse, SearchHit, SearchResponse,
    },
    AppError, Config,
};
use reqwest::{multipart, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// HTTP client for the library API.
#[derive(Debug, Clone)]
pub struct HttpLibraryApi {
    client: reqwest::Client,
    server: String,
}

impl HttpLibraryApi {
    /// Build a client from configuration.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] for an unusable server URL and
    /// [`AppError::Network`] when the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(transport_error)?;
        Self::with_client(client, &config.server_url)
    }

    /// Wrap an existing `reqwest::Client`.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] when `server` is not a usable base URL.
    pub fn with_client(client: reqwest::Client, server: &str) -> Result<Self, AppError> {
        let server = normalize_server_url(server);
        api_url(&server, &[])?;
        Ok(Self { client, server })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, AppError> {
        api_url(&self.server, segments)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        action: &str,
        segments: &[&str],
    ) -> Result<T, AppError> {
        let request = self.client.get(self.url(segments)?);
        let response = send_checked(request, action).await?;
        decode_json(response, action).await
    }

    async fn get_papers(&self, action: &str, segments: &[&str]) -> Result<Vec<Paper>, AppError> {
        let response: PapersResponse = self.get_json(action, segments).await?;
        Ok(response.papers)
    }
}

/// Map a transport failure into the network error taxonomy.
pub fn transport_error(err: reqwest::Error) -> AppError {
    let message = if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    };
    AppError::transport(message)
}

/// Extract a user-facing message from an error response body.
///
/// Prefers the API's `detail` field, then an `error` field, then the raw
/// body, then the status reason phrase.
pub fn error_message_for_response(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for field in ["detail", "error"] {
            match value.get(field) {
                Some(Value::String(message)) => return message.clone(),
                Some(Value::Null) | None => continue,
                Some(other) => return other.to_string(),
            }
        }
    }

    body.to_string()
}

/// Append percent-encoded path segments to the server URL.
///
/// An empty segment produces a trailing slash (`/folders/`).
pub fn api_url(server: &str, segments: &[&str]) -> Result<Url, AppError> {
    let mut url = Url::parse(server)
        .map_err(|err| AppError::Validation(format!("Invalid server URL '{}': {}", server, err)))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| AppError::Validation("Server URL cannot be used as an API base".to_string()))?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

async fn send_checked(
    request: RequestBuilder,
    action: &str,
) -> Result<reqwest::Response, AppError> {
    let response = request.send().await.map_err(|err| {
        tracing::error!("{} failed: {}", action, err);
        transport_error(err)
    })?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => format!("failed to read error response body: {}", err),
    };
    let message = error_message_for_response(status, &body);
    tracing::error!("{} failed ({}): {}", action, status, message);
    Err(AppError::http_status(status.as_u16(), message))
}

async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
    action: &str,
) -> Result<T, AppError> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|err| {
        tracing::error!("{} returned malformed JSON: {}", action, err);
        AppError::Serialization(err)
    })
}

#[async_trait]
impl LibraryApi for HttpLibraryApi {
    async fn list_folders(&self) -> Result<Vec<Folder>, AppError> {
        let response: FoldersResponse = self.get_json("Load folders", &["folders", ""]).await?;
        Ok(response.folders)
    }

    async fn create_folder(&self, payload: &FolderPayload) -> Result<Folder, AppError> {
        let request = self.client.post(self.url(&["folders", ""])?).json(payload);
        let response = send_checked(request, "Create folder").await?;
        decode_json(response, "Create folder").await
    }

    async fn update_folder(
        &self,
        folder_id: &str,
        payload: &FolderPayload,
    ) -> Result<Folder, AppError> {
        let request = self.client.put(self.url(&["folders", folder_id])?).json(payload);
        let response = send_checked(request, "Update folder").await?;
        decode_json(response, "Update folder").await
    }

    async fn delete_folder(&self, folder_id: &str) -> Result<(), AppError> {
        let request = self.client.delete(self.url(&["folders", folder_id])?);
        send_checked(request, "Delete folder").await?;
        Ok(())
    }

    async fn list_papers(&self) -> Result<Vec<Paper>, AppError> {
        self.get_papers("Load papers", &["papers", ""]).await
    }

    async fn papers_by_folder(&self, folder_id: &str) -> Result<Vec<Paper>, AppError> {
        self.get_papers("Load papers in folder", &["papers", "by-folder", folder_id])
            .await
    }

    async fn papers_by_category(&self, category: &str) -> Result<Vec<Paper>, AppError> {
        self.get_papers("Filter by category", &["papers", "by-category", category])
            .await
    }

    async fn papers_by_tag(&self, tag: &str) -> Result<Vec<Paper>, AppError> {
        self.get_papers("Filter by tag", &["papers", "by-tag", tag]).await
    }

    async fn paper_metadata(&self, filename: &str) -> Result<Paper, AppError> {
        self.get_json("Load paper details", &["papers", filename, "metadata"])
            .await
    }

    async fn update_metadata(
        &self,
        filename: &str,
        update: &MetadataUpdate,
    ) -> Result<(), AppError> {
        let request = self
            .client
            .put(self.url(&["papers", filename, "metadata"])?)
            .json(update);
        send_checked(request, "Update metadata").await?;
        Ok(())
    }

    async fn delete_paper(&self, filename: &str, soft_delete: bool) -> Result<(), AppError> {
        let request = self
            .client
            .delete(self.url(&["papers", filename])?)
            .query(&[("soft_delete", soft_delete)]);
        send_checked(request, "Delete paper").await?;
        Ok(())
    }

    async fn move_paper(
        &self,
        filename: &str,
        folder_id: Option<&str>,
        original_folder_id: Option<&str>,
    ) -> Result<(), AppError> {
        let mut request = self.client.put(self.url(&["papers", filename, "move"])?);
        if let Some(folder_id) = folder_id {
            request = request.query(&[("folder_id", folder_id)]);
        }
        if let Some(original_folder_id) = original_folder_id {
            request = request.query(&[("original_folder_id", original_folder_id)]);
        }
        send_checked(request, "Move paper").await?;
        Ok(())
    }

    async fn upload_paper(&self, upload: PaperUpload<'_>) -> Result<(), AppError> {
        let metadata = serde_json::to_string(&upload.metadata)?;
        let file_part = multipart::Part::bytes(upload.file.bytes.clone())
            .file_name(upload.file.file_name.clone())
            .mime_str(upload.file.content_type())
            .map_err(transport_error)?;
        let mut form = multipart::Form::new()
            .part("file", file_part)
            .text("metadata", metadata);
        if let Some(folder_id) = upload.folder_id {
            form = form.text("folder_id", folder_id.to_string());
        }
        let request = self.client.post(self.url(&["papers", ""])?).multipart(form);
        send_checked(request, "Upload").await?;
        Ok(())
    }

    async fn search(&self, query: &str, n_results: usize) -> Result<Vec<SearchHit>, AppError> {
        let request = self
            .client
            .get(self.url(&["search", ""])?)
            .query(&[("query", query)])
            .query(&[("n_results", n_results)]);
        let response = send_checked(request, "Search").await?;
        let response: SearchResponse = decode_json(response, "Search").await?;
        Ok(response.results)
    }

    async fn stats(&self) -> Result<LibraryStats, AppError> {
        self.get_json("Load stats", &["stats"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_detail_field() {
        let message =
            error_message_for_response(StatusCode::NOT_FOUND, r#"{"detail":"Paper not found"}"#);
        assert_eq!(message, "Paper not found");
    }

    #[test]
    fn error_message_falls_back_through_error_body_and_reason() {
        assert_eq!(
            error_message_for_response(StatusCode::BAD_REQUEST, r#"{"error":"bad"}"#),
            "bad"
        );
        assert_eq!(
            error_message_for_response(StatusCode::BAD_REQUEST, "plain text"),
            "plain text"
        );
        assert_eq!(
            error_message_for_response(StatusCode::BAD_REQUEST, "   "),
            "Bad Request"
        );
        assert_eq!(
            error_message_for_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                r#"{"detail":[{"msg":"field required"}]}"#
            ),
            r#"[{"msg":"field required"}]"#
        );
    }

    #[test]
    fn api_url_encodes_path_segments() {
        let url = api_url("http://127.0.0.1:8000", &["papers", "a b/c?.pdf", "metadata"])
            .expect("api_url should build");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/papers/a%20b%2Fc%3F.pdf/metadata"
        );
    }

    #[test]
    fn api_url_keeps_trailing_slash_endpoints() {
        let url = api_url("http://127.0.0.1:8000/base/", &["folders", ""]).expect("url");
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/base/folders/");
    }

    #[test]
    fn with_client_rejects_invalid_server() {
        let err = HttpLibraryApi::with_client(reqwest::Client::new(), "not a url")
            .expect_err("invalid url");
        assert!(matches!(err, AppError::Validation(_)));

        let api = HttpLibraryApi::with_client(reqwest::Client::new(), "http://localhost:8000/")
            .expect("valid url");
        assert_eq!(api.server, "http://localhost:8000");
    }
}
