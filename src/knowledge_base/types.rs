//! Wire types for the knowledge-base REST API

use crate::config::KnowledgeBaseConfig;
use serde::{Deserialize, Serialize};

/// Search method that uses weighted vector/keyword scoring
pub const HYBRID_SEARCH: &str = "hybrid_search";

/// Metadata field value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Time,
}

/// Body of `POST /v1/datasets`
#[derive(Debug, Clone, Serialize)]
pub struct CreateDatasetRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub indexing_technique: &'a str,
    pub permission: &'a str,
    pub provider: &'a str,
    pub embedding_model: &'a str,
    pub embedding_model_provider: &'a str,
    pub retrieval_model: RetrievalModel,
}

impl<'a> CreateDatasetRequest<'a> {
    pub fn from_config(config: &'a KnowledgeBaseConfig) -> Self {
        Self {
            name: &config.name,
            description: &config.description,
            indexing_technique: &config.indexing_technique,
            permission: &config.permission,
            provider: "vendor",
            embedding_model: &config.embedding_model,
            embedding_model_provider: &config.embedding_model_provider,
            retrieval_model: RetrievalModel::basic(config),
        }
    }
}

/// Retrieval settings of a dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalModel {
    pub search_method: String,
    pub reranking_enable: bool,
    pub top_k: u32,
    pub score_threshold_enabled: bool,
    /// `null` when the threshold is disabled
    pub score_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reranking_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<RetrievalWeights>,
}

impl RetrievalModel {
    /// Settings sent at dataset creation (no reranking mode or weights)
    pub fn basic(config: &KnowledgeBaseConfig) -> Self {
        Self {
            search_method: config.search_method.clone(),
            reranking_enable: config.reranking_enabled,
            top_k: config.top_k,
            score_threshold_enabled: config.score_threshold_enabled,
            score_threshold: config
                .score_threshold_enabled
                .then_some(config.score_threshold),
            reranking_mode: None,
            weights: None,
        }
    }

    /// Full settings applied after creation
    ///
    /// Hybrid search gets `weighted_score` reranking with vector weight `w`
    /// and keyword weight `1 - w`, both rounded to two decimals. Other
    /// methods get `reranking_model`.
    pub fn weighted(config: &KnowledgeBaseConfig) -> Self {
        let mut model = Self::basic(config);

        if config.search_method == HYBRID_SEARCH {
            model.reranking_mode = Some("weighted_score".to_string());
            model.weights = Some(RetrievalWeights {
                weight_type: "customized".to_string(),
                vector_setting: VectorSetting {
                    vector_weight: round2(config.weights),
                    embedding_model_name: config.embedding_model.clone(),
                    embedding_provider_name: config.embedding_model_provider.clone(),
                },
                keyword_setting: KeywordSetting {
                    keyword_weight: round2(1.0 - config.weights),
                },
            });
        } else {
            model.reranking_mode = Some("reranking_model".to_string());
        }

        model
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalWeights {
    pub weight_type: String,
    pub vector_setting: VectorSetting,
    pub keyword_setting: KeywordSetting,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorSetting {
    pub vector_weight: f64,
    pub embedding_model_name: String,
    pub embedding_provider_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordSetting {
    pub keyword_weight: f64,
}

/// Body of `PATCH /v1/datasets/{id}`
#[derive(Debug, Clone, Serialize)]
pub struct UpdateDatasetRequest {
    pub retrieval_model: RetrievalModel,
}

/// Dataset as returned on creation
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A metadata field definition
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetadataField {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: Option<FieldType>,
}

/// Response of `GET /v1/datasets/{id}/metadata`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataFieldList {
    #[serde(default)]
    pub doc_metadata: Vec<MetadataField>,
}

/// Body of `POST /v1/datasets/{id}/metadata`
#[derive(Debug, Clone, Serialize)]
pub struct CreateMetadataFieldRequest<'a> {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub name: &'a str,
}

/// One entry of a document listing
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSummary {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// One page of `GET /v1/datasets/{id}/documents`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentPage {
    #[serde(default)]
    pub data: Vec<DocumentSummary>,
    #[serde(default)]
    pub has_more: bool,
}

/// Body of `POST /v1/datasets/{id}/document/create-by-text`
#[derive(Debug, Clone, Serialize)]
pub struct CreateDocumentRequest<'a> {
    pub name: &'a str,
    pub text: &'a str,
    pub indexing_technique: &'a str,
    pub doc_form: &'a str,
    pub process_rule: ProcessRule,
}

impl<'a> CreateDocumentRequest<'a> {
    /// Parent-child chunking with the whole document as parent
    pub fn hierarchical(name: &'a str, text: &'a str) -> Self {
        Self {
            name,
            text,
            indexing_technique: "high_quality",
            doc_form: "hierarchical_model",
            process_rule: ProcessRule::hierarchical(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessRule {
    pub mode: String,
    pub rules: ProcessRules,
}

impl ProcessRule {
    pub fn hierarchical() -> Self {
        Self {
            mode: "hierarchical".to_string(),
            rules: ProcessRules {
                pre_processing_rules: vec![
                    PreProcessingRule {
                        id: "remove_extra_spaces".to_string(),
                        enabled: true,
                    },
                    PreProcessingRule {
                        id: "remove_urls_emails".to_string(),
                        enabled: false,
                    },
                ],
                segmentation: Segmentation {
                    separator: "\\n".to_string(),
                    max_tokens: 1024,
                    chunk_overlap: None,
                },
                parent_mode: "full-doc".to_string(),
                subchunk_segmentation: Segmentation {
                    separator: "\\n".to_string(),
                    max_tokens: 512,
                    chunk_overlap: Some(50),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessRules {
    pub pre_processing_rules: Vec<PreProcessingRule>,
    pub segmentation: Segmentation,
    pub parent_mode: String,
    pub subchunk_segmentation: Segmentation,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreProcessingRule {
    pub id: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Segmentation {
    pub separator: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_overlap: Option<u32>,
}

/// Response of document creation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDocumentResponse {
    #[serde(default)]
    pub document: Option<CreatedDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedDocument {
    #[serde(default)]
    pub id: Option<String>,
}

/// A metadata value to attach to a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataValue {
    pub id: String,
    pub value: String,
    pub name: String,
}

/// Body of `POST /v1/datasets/{id}/documents/metadata`
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMetadataUpdate {
    pub operation_data: Vec<DocumentMetadataOperation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentMetadataOperation {
    pub document_id: String,
    pub metadata_list: Vec<MetadataValue>,
}
