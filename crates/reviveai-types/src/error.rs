use thiserror::Error;

/// Errors from carbon catalogue operations (vector store, rerank).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("carbon catalogue is empty -- run `reviveai ingest` first")]
    EmptyCatalog,

    #[error("rerank selected index {index} out of {count} candidates")]
    RerankOutOfRange { index: usize, count: usize },

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("model output could not be parsed: {0}")]
    MalformedSelection(String),

    #[error(transparent)]
    Llm(#[from] crate::llm::LlmError),
}

/// Errors from the web-search agent and its tools.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search provider error: {0}")]
    Provider(String),

    #[error("agent produced no answer after {0} tool rounds")]
    Exhausted(usize),

    #[error(transparent)]
    Llm(#[from] crate::llm::LlmError),
}

/// Errors from AI image generation and editing.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image model error: {0}")]
    Model(String),

    #[error("response contained no image data")]
    NoImageReturned,

    #[error("prompt generation failed: {0}")]
    PromptGeneration(String),

    #[error("filesystem error: {0}")]
    FileSystem(String),

    #[error(transparent)]
    Llm(#[from] crate::llm::LlmError),
}

/// Errors from catalogue ingestion (CSV parsing, cleaning, loading).
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read catalogue file: {0}")]
    Io(String),

    #[error("malformed CSV record at line {line}: {message}")]
    MalformedRecord { line: u64, message: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
