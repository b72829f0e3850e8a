//! Knowledge-base REST client
//!
//! A thin client over the dataset, metadata and document endpoints. Every
//! call uses bearer authentication and surfaces non-success statuses as
//! [`KnowledgeBaseError::Http`] with the response body attached.

use crate::config::KnowledgeBaseConfig;
use crate::knowledge_base::types::{
    CreateDatasetRequest, CreateDocumentRequest, CreateDocumentResponse,
    CreateMetadataFieldRequest, Dataset, DocumentMetadataOperation, DocumentMetadataUpdate,
    DocumentPage, FieldType, MetadataField, MetadataFieldList, MetadataValue, RetrievalModel,
    UpdateDatasetRequest,
};
use crate::knowledge_base::{KnowledgeBaseError, KnowledgeBaseResult};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;

/// Documents requested per listing page
const DOCUMENT_PAGE_SIZE: u32 = 20;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Metadata fields every imported document may carry
const STANDARD_FIELDS: [(&str, FieldType); 4] = [
    ("source_url", FieldType::String),
    ("domain", FieldType::String),
    ("crawl_date", FieldType::Time),
    ("description", FieldType::String),
];

/// Only present when pages were fetched from the metadata-exposing endpoint
const LANGUAGE_FIELD: (&str, FieldType) = ("language", FieldType::String);

pub struct KnowledgeBaseClient {
    client: Client,
    base_url: String,
    api_key: String,
    dataset_id: Option<String>,
}

impl KnowledgeBaseClient {
    /// Creates a client for the API at `base_url`
    pub fn new(base_url: &str, api_key: impl Into<String>) -> KnowledgeBaseResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("sitemap-reader/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            dataset_id: None,
        })
    }

    /// Selects the dataset used by dataset-scoped calls
    pub fn with_dataset(mut self, dataset_id: impl Into<String>) -> Self {
        self.dataset_id = Some(dataset_id.into());
        self
    }

    pub fn set_dataset(&mut self, dataset_id: impl Into<String>) {
        self.dataset_id = Some(dataset_id.into());
    }

    pub fn dataset_id(&self) -> KnowledgeBaseResult<&str> {
        self.dataset_id
            .as_deref()
            .ok_or(KnowledgeBaseError::MissingField("dataset_id"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{}", self.base_url, path)
    }

    fn dataset_url(&self, path: &str) -> KnowledgeBaseResult<String> {
        Ok(self.url(&format!("/datasets/{}{}", self.dataset_id()?, path)))
    }

    async fn send(&self, request: RequestBuilder) -> KnowledgeBaseResult<Response> {
        let response = request.bearer_auth(&self.api_key).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KnowledgeBaseError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> KnowledgeBaseResult<T> {
        Ok(self.send(request).await?.json().await?)
    }

    /// Creates a dataset and returns its id
    pub async fn create_dataset(&self, config: &KnowledgeBaseConfig) -> KnowledgeBaseResult<String> {
        tracing::info!(name = %config.name, "Creating knowledge base");

        let body = CreateDatasetRequest::from_config(config);
        let dataset: Dataset = self
            .send_json(self.client.post(self.url("/datasets")).json(&body))
            .await?;

        let id = dataset
            .id
            .filter(|id| !id.is_empty())
            .ok_or(KnowledgeBaseError::MissingField("id"))?;

        tracing::info!(
            id = %id,
            name = dataset.name.as_deref().unwrap_or(&config.name),
            embedding_model = %config.embedding_model,
            search_method = %config.search_method,
            "Knowledge base created"
        );
        Ok(id)
    }

    /// Applies the full retrieval model (including hybrid weights) to a dataset
    pub async fn update_retrieval_model(
        &self,
        dataset_id: &str,
        config: &KnowledgeBaseConfig,
    ) -> KnowledgeBaseResult<()> {
        let body = UpdateDatasetRequest {
            retrieval_model: RetrievalModel::weighted(config),
        };
        let url = self.url(&format!("/datasets/{}", dataset_id));
        self.send(self.client.patch(url).json(&body)).await?;

        tracing::info!(
            dataset = %dataset_id,
            search_method = %config.search_method,
            top_k = config.top_k,
            "Retrieval model updated"
        );
        Ok(())
    }

    /// Lists the dataset's metadata field definitions
    pub async fn list_metadata_fields(&self) -> KnowledgeBaseResult<Vec<MetadataField>> {
        let list: MetadataFieldList = self
            .send_json(self.client.get(self.dataset_url("/metadata")?))
            .await?;
        Ok(list.doc_metadata)
    }

    /// Creates one metadata field definition
    pub async fn create_metadata_field(
        &self,
        name: &str,
        field_type: FieldType,
    ) -> KnowledgeBaseResult<MetadataField> {
        let body = CreateMetadataFieldRequest { field_type, name };
        self.send_json(self.client.post(self.dataset_url("/metadata")?).json(&body))
            .await
    }

    /// Makes sure the standard fields exist and returns `name -> id`
    ///
    /// Existing fields are reused. A field that cannot be created is logged
    /// and left out of the map, so its values are simply not attached.
    pub async fn ensure_metadata_fields(
        &self,
        eu_compliance: bool,
    ) -> KnowledgeBaseResult<BTreeMap<String, String>> {
        let mut fields: BTreeMap<String, String> = self
            .list_metadata_fields()
            .await?
            .into_iter()
            .map(|f| (f.name, f.id))
            .collect();

        let mut wanted = STANDARD_FIELDS.to_vec();
        if !eu_compliance {
            wanted.push(LANGUAGE_FIELD);
        }

        for (name, field_type) in wanted {
            if fields.contains_key(name) {
                tracing::debug!(field = name, "Metadata field already exists");
                continue;
            }
            match self.create_metadata_field(name, field_type).await {
                Ok(field) => {
                    tracing::info!(field = name, "Created metadata field");
                    fields.insert(field.name, field.id);
                }
                Err(e) => tracing::warn!(field = name, error = %e, "Failed to create metadata field"),
            }
        }

        Ok(fields)
    }

    /// Finds a document by exact name, walking every listing page
    pub async fn find_document_by_name(&self, name: &str) -> KnowledgeBaseResult<Option<String>> {
        let url = self.dataset_url("/documents")?;
        let mut page = 1u32;

        loop {
            let listing: DocumentPage = self
                .send_json(
                    self.client
                        .get(&url)
                        .query(&[("page", page), ("limit", DOCUMENT_PAGE_SIZE)]),
                )
                .await?;

            if let Some(doc) = listing
                .data
                .into_iter()
                .find(|doc| doc.name.as_deref() == Some(name))
            {
                return Ok(Some(doc.id));
            }

            if !listing.has_more {
                return Ok(None);
            }
            page += 1;
        }
    }

    pub async fn delete_document(&self, document_id: &str) -> KnowledgeBaseResult<()> {
        let url = self.dataset_url(&format!("/documents/{}", document_id))?;
        self.send(self.client.delete(url)).await?;
        tracing::info!(document = %document_id, "Deleted existing document");
        Ok(())
    }

    /// Creates a document from text and returns its id
    pub async fn create_document_by_text(&self, name: &str, text: &str) -> KnowledgeBaseResult<String> {
        let body = CreateDocumentRequest::hierarchical(name, text);
        let created: CreateDocumentResponse = self
            .send_json(
                self.client
                    .post(self.dataset_url("/document/create-by-text")?)
                    .json(&body),
            )
            .await?;

        created
            .document
            .and_then(|doc| doc.id)
            .filter(|id| !id.is_empty())
            .ok_or(KnowledgeBaseError::MissingField("document.id"))
    }

    /// Attaches metadata values to one document
    pub async fn update_document_metadata(
        &self,
        document_id: &str,
        values: Vec<MetadataValue>,
    ) -> KnowledgeBaseResult<()> {
        let body = DocumentMetadataUpdate {
            operation_data: vec![DocumentMetadataOperation {
                document_id: document_id.to_string(),
                metadata_list: values,
            }],
        };
        self.send(
            self.client
                .post(self.dataset_url("/documents/metadata")?)
                .json(&body),
        )
        .await?;
        Ok(())
    }
}
