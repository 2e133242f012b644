//! REST implementation of the document, unit and category collaborators.

use crate::config::{AuthConfig, PlotdocConfig};
use async_trait::async_trait;
use plotdoc_core::{
    Block, Category, Document, DocumentCreate, DocumentId, DocumentPage, DocumentPatch,
    DocumentQuery, LandPlot, LookupError, Plot, PropertyId,
};
use plotdoc_storage::{CategorySource, DocumentService, UnitSources};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl From<ApiClientError> for LookupError {
    fn from(err: ApiClientError) -> Self {
        match err {
            ApiClientError::Http(e) if e.is_decode() => LookupError::Decode {
                reason: e.to_string(),
            },
            ApiClientError::Http(e) => match e.status() {
                Some(status) => LookupError::Status {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => LookupError::transport(e.to_string()),
            },
            ApiClientError::Status { status, message } => LookupError::Status { status, message },
            ApiClientError::Serde(e) => LookupError::Decode {
                reason: e.to_string(),
            },
            ApiClientError::InvalidResponse(reason) => LookupError::Decode { reason },
            ApiClientError::Config(reason) => LookupError::transport(reason),
        }
    }
}

/// Error body returned by the back office API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(alias = "error")]
    message: String,
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderMap,
}

impl RestClient {
    pub fn new(config: &PlotdocConfig) -> Result<Self, ApiClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let auth_header = build_auth_headers(&config.auth)?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn query_documents(&self, query: &DocumentQuery) -> Result<DocumentPage, ApiClientError> {
        self.get_json("/api/documents", Some(query)).await
    }

    /// Upload a document using multipart/form-data.
    pub async fn create_document(&self, create: &DocumentCreate) -> Result<Document, ApiClientError> {
        let url = format!("{}/api/documents", self.base_url);
        let response = self
            .client
            .post(url)
            .headers(self.auth_header.clone())
            .multipart(create_form(create)?)
            .send()
            .await?;
        self.parse_response(response).await
    }

    pub async fn update_document(
        &self,
        id: DocumentId,
        patch: &DocumentPatch,
    ) -> Result<Document, ApiClientError> {
        let url = format!("{}/api/documents/{}", self.base_url, id);
        let response = self
            .client
            .patch(url)
            .headers(self.auth_header.clone())
            .json(patch)
            .send()
            .await?;
        self.parse_response(response).await
    }

    pub async fn delete_document(&self, id: DocumentId) -> Result<(), ApiClientError> {
        let url = format!("{}/api/documents/{}", self.base_url, id);
        let response = self
            .client
            .delete(url)
            .headers(self.auth_header.clone())
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await?;
        Err(status_error(status.as_u16(), &text))
    }

    pub async fn list_plots(&self, property_id: PropertyId) -> Result<Vec<Plot>, ApiClientError> {
        let path = format!("/api/properties/{}/plots", property_id);
        self.get_json::<_, ()>(&path, None).await
    }

    pub async fn list_land_plots(
        &self,
        property_id: PropertyId,
    ) -> Result<Vec<LandPlot>, ApiClientError> {
        let path = format!("/api/properties/{}/land-plots", property_id);
        self.get_json::<_, ()>(&path, None).await
    }

    pub async fn list_blocks(&self, property_id: PropertyId) -> Result<Vec<Block>, ApiClientError> {
        let path = format!("/api/properties/{}/blocks", property_id);
        self.get_json::<_, ()>(&path, None).await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiClientError> {
        self.get_json::<_, ()>("/api/document-categories", None).await
    }

    async fn get_json<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<T, ApiClientError>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(url).headers(self.auth_header.clone());
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request.send().await?;
        self.parse_response(response).await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let text = response.text().await?;
            Err(status_error(status.as_u16(), &text))
        }
    }
}

fn status_error(status: u16, body: &str) -> ApiClientError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.to_string());
    ApiClientError::Status { status, message }
}

/// Text fields of the multipart create payload, in sending order. Unset
/// optional fields are omitted.
pub fn create_fields(create: &DocumentCreate) -> Result<Vec<(&'static str, String)>, ApiClientError> {
    let mut fields = vec![
        ("title", create.title.clone()),
        ("category_id", create.category_id.to_string()),
        ("property_id", create.property_id.to_string()),
    ];
    if let Some(description) = &create.description {
        fields.push(("description", description.clone()));
    }
    if let Some(plot_number) = &create.plot_number {
        fields.push(("plot_number", plot_number.clone()));
    }
    if let Some(plot_id) = create.plot_id {
        fields.push(("plot_id", plot_id.to_string()));
    }
    if let Some(plot_type) = create.plot_type {
        fields.push(("plot_type", plot_type.to_string()));
    }
    fields.push(("tags", serde_json::to_string(&create.tags)?));
    fields.push(("status", create.status.to_string()));
    Ok(fields)
}

fn create_form(create: &DocumentCreate) -> Result<Form, ApiClientError> {
    let mut file = Part::bytes(create.file.bytes.clone()).file_name(create.file.file_name.clone());
    if let Some(content_type) = &create.file.content_type {
        file = file
            .mime_str(content_type)
            .map_err(|e| ApiClientError::InvalidResponse(format!("invalid content type: {}", e)))?;
    }
    let form = create_fields(create)?
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));
    Ok(form.part("file", file))
}

fn build_auth_headers(auth: &AuthConfig) -> Result<HeaderMap, ApiClientError> {
    let mut headers = HeaderMap::new();
    if let Some(api_key) = &auth.api_key {
        headers.insert(
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(api_key).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    if let Some(jwt) = &auth.jwt {
        let value = format!("Bearer {}", jwt);
        headers.insert(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&value).map_err(|e| ApiClientError::Config(e.to_string()))?,
        );
    }
    Ok(headers)
}

// ============================================================================
// COLLABORATOR IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl DocumentService for RestClient {
    async fn query(&self, query: &DocumentQuery) -> Result<DocumentPage, LookupError> {
        Ok(self.query_documents(query).await?)
    }

    async fn create(&self, create: &DocumentCreate) -> Result<Document, LookupError> {
        Ok(self.create_document(create).await?)
    }

    async fn update(&self, id: DocumentId, patch: &DocumentPatch) -> Result<Document, LookupError> {
        Ok(self.update_document(id, patch).await?)
    }

    async fn delete(&self, id: DocumentId) -> Result<(), LookupError> {
        Ok(self.delete_document(id).await?)
    }
}

#[async_trait]
impl UnitSources for RestClient {
    async fn plots(&self, property_id: PropertyId) -> Result<Vec<Plot>, LookupError> {
        Ok(self.list_plots(property_id).await?)
    }

    async fn land_plots(&self, property_id: PropertyId) -> Result<Vec<LandPlot>, LookupError> {
        Ok(self.list_land_plots(property_id).await?)
    }

    async fn blocks(&self, property_id: PropertyId) -> Result<Vec<Block>, LookupError> {
        Ok(self.list_blocks(property_id).await?)
    }
}

#[async_trait]
impl CategorySource for RestClient {
    async fn categories(&self) -> Result<Vec<Category>, LookupError> {
        Ok(self.list_categories().await?)
    }
}
