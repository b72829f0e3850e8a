use serde::Deserialize;

/// Reader endpoint used when EU compliance is enabled
pub const EU_READER_ENDPOINT: &str = "https://eu-r-beta.jina.ai/";

/// Reader endpoint used when EU compliance is disabled
pub const GLOBAL_READER_ENDPOINT: &str = "https://r.jina.ai/";

/// Placeholder key shipped in sample configs; treated as "no key"
pub const PLACEHOLDER_API_KEY: &str = "your_jina_api_key_here";

/// Main configuration structure for Sitemap-Reader
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reader: ReaderConfig,
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(rename = "knowledge-base")]
    pub knowledge_base: Option<KnowledgeBaseConfig>,
}

/// Reader API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReaderConfig {
    /// Bearer credential for the reader API
    #[serde(default)]
    pub api_key: Option<String>,

    /// Selects the EU endpoint (no response metadata) over the global one
    #[serde(default = "default_true")]
    pub eu_compliance: bool,

    /// Ask the reader to bypass its cache on every request
    #[serde(default)]
    pub no_cache: bool,

    /// Elements to strip from the page before extraction
    #[serde(default)]
    pub css_selector: Option<String>,

    /// Element to wait for before extraction
    #[serde(default)]
    pub wait_for_selector: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Additional attempts after the first (total attempts = retry_count + 1)
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Overrides the region endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// Crawl loop configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Sitemap URL (ending in `.xml`) or a single page URL
    pub target: String,

    /// 1-based position in the resolved URL list to start from
    #[serde(default = "default_start_index")]
    pub start_index: usize,

    /// Lower bound of the randomized inter-request delay (seconds)
    #[serde(default = "default_min_delay")]
    pub min_delay: f64,

    /// Upper bound of the randomized inter-request delay (seconds)
    #[serde(default = "default_max_delay")]
    pub max_delay: f64,

    /// Wall-clock budget for the whole crawl in seconds (0 = unlimited)
    #[serde(default)]
    pub crawler_timeout: u64,

    /// Append failures and rewrite a progress summary after every URL
    #[serde(default)]
    pub live_report: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Root directory holding every crawl's output directory
    #[serde(default = "default_output_root")]
    pub root: String,

    /// Name of this crawl's directory under the root
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

/// Knowledge-base import configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KnowledgeBaseConfig {
    #[serde(default = "default_kb_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Existing dataset to import into; a new one is created when absent
    #[serde(default)]
    pub dataset_id: Option<String>,

    #[serde(default = "default_kb_name")]
    pub name: String,

    #[serde(default = "default_kb_description")]
    pub description: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    #[serde(default = "default_embedding_model_provider")]
    pub embedding_model_provider: String,

    #[serde(default = "default_indexing_technique")]
    pub indexing_technique: String,

    #[serde(default = "default_permission")]
    pub permission: String,

    #[serde(default = "default_search_method")]
    pub search_method: String,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_true")]
    pub score_threshold_enabled: bool,

    #[serde(default = "default_score_threshold")]
    pub score_threshold: f64,

    #[serde(default)]
    pub reranking_enabled: bool,

    /// Semantic weight for hybrid search (keyword weight = 1 - weights)
    #[serde(default = "default_weights")]
    pub weights: f64,
}

impl ReaderConfig {
    /// Returns the endpoint requests should be sent to
    pub fn endpoint(&self) -> &str {
        match &self.endpoint {
            Some(endpoint) => endpoint,
            None if self.eu_compliance => EU_READER_ENDPOINT,
            None => GLOBAL_READER_ENDPOINT,
        }
    }

    /// Returns the API key if one is usable
    ///
    /// Blank keys and the sample placeholder are treated as absent.
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
    }

    /// Whether responses carry page metadata (description, language)
    pub fn exposes_metadata(&self) -> bool {
        !self.eu_compliance
    }
}

impl OutputConfig {
    /// Directory that receives this crawl's files
    pub fn crawl_dir(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.root).join(&self.directory)
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            eu_compliance: true,
            no_cache: false,
            css_selector: None,
            wait_for_selector: None,
            request_timeout: default_request_timeout(),
            retry_count: default_retry_count(),
            endpoint: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
            directory: default_output_directory(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    2
}

fn default_start_index() -> usize {
    1
}

fn default_min_delay() -> f64 {
    3.0
}

fn default_max_delay() -> f64 {
    6.0
}

fn default_output_root() -> String {
    "crawl-result".to_string()
}

fn default_output_directory() -> String {
    "output".to_string()
}

fn default_kb_base_url() -> String {
    "https://api.dify.ai".to_string()
}

fn default_kb_name() -> String {
    "Jina Reader Crawl Results".to_string()
}

fn default_kb_description() -> String {
    "Knowledge base containing crawled content from Jina Reader".to_string()
}

fn default_embedding_model() -> String {
    "mistral-embed".to_string()
}

fn default_embedding_model_provider() -> String {
    "mistralai".to_string()
}

fn default_indexing_technique() -> String {
    "high_quality".to_string()
}

fn default_permission() -> String {
    "only_me".to_string()
}

fn default_search_method() -> String {
    "hybrid_search".to_string()
}

fn default_top_k() -> u32 {
    2
}

fn default_score_threshold() -> f64 {
    0.7
}

fn default_weights() -> f64 {
    0.7
}
