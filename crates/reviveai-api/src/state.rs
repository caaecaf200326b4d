//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over provider/embedder/catalogue traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use reviveai_core::carbon::CarbonCalculator;
use reviveai_core::content::ContentGenerator;
use reviveai_core::image::ImageStudio;
use reviveai_core::post::{SeekingPostGenerator, SellingPostGenerator};
use reviveai_core::search::{SearchAgent, WebTool};
use reviveai_core::vision::VisionAnalyzer;
use reviveai_infra::config::{
    BRAVE_SEARCH_API_KEY_VAR, GOOGLE_API_KEY_VAR, OPENAI_API_KEY_VAR, load_config,
    optional_api_key, require_api_key, resolve_data_dir,
};
use reviveai_infra::embedder::{EMBEDDING_MODEL_NAME, FastEmbedder};
use reviveai_infra::image::GeminiImageClient;
use reviveai_infra::llm::OpenAiCompatibleProvider;
use reviveai_infra::search::{BraveSearchTool, FetchWebpageTool};
use reviveai_infra::vector::{LanceCatalogStore, LanceVectorStore};
use reviveai_types::config::AppConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteVisionAnalyzer = VisionAnalyzer<OpenAiCompatibleProvider>;
pub type ConcreteContentGenerator = ContentGenerator<OpenAiCompatibleProvider>;
pub type ConcreteSellingPostGenerator = SellingPostGenerator<OpenAiCompatibleProvider>;
pub type ConcreteSeekingPostGenerator = SeekingPostGenerator<OpenAiCompatibleProvider>;
pub type ConcreteSearchAgent = SearchAgent<OpenAiCompatibleProvider>;
pub type ConcreteCarbonCalculator =
    CarbonCalculator<OpenAiCompatibleProvider, FastEmbedder, LanceCatalogStore>;
pub type ConcreteImageStudio = ImageStudio<OpenAiCompatibleProvider, GeminiImageClient>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub vision: Arc<ConcreteVisionAnalyzer>,
    pub content: Arc<ConcreteContentGenerator>,
    pub selling: Arc<ConcreteSellingPostGenerator>,
    pub seeking: Arc<ConcreteSeekingPostGenerator>,
    pub search_agent: Arc<ConcreteSearchAgent>,
    pub carbon: Arc<ConcreteCarbonCalculator>,
    /// Present only when GOOGLE_API_KEY is configured.
    pub image_studio: Option<Arc<ConcreteImageStudio>>,
    pub config: AppConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, connect the vector
    /// store, initialize the embedder, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data and media directories exist
        tokio::fs::create_dir_all(data_dir.join("media")).await?;

        let config = load_config(&data_dir).await;

        let openai_key = require_api_key(OPENAI_API_KEY_VAR)?;

        // Each service gets its own provider handle pinned to its model.
        let vision = VisionAnalyzer::new(
            OpenAiCompatibleProvider::openai(openai_key.clone(), &config.models.vision),
            config.models.vision.as_str(),
        );
        let content = ContentGenerator::new(
            OpenAiCompatibleProvider::openai(openai_key.clone(), &config.models.content),
            config.models.content.as_str(),
        );
        let selling = SellingPostGenerator::new(
            OpenAiCompatibleProvider::openai(openai_key.clone(), &config.models.content),
            config.models.content.as_str(),
        );
        let seeking = SeekingPostGenerator::new(
            OpenAiCompatibleProvider::openai(openai_key.clone(), &config.models.content),
            config.models.content.as_str(),
        );

        // Web research agent with its tools
        let tools: Vec<Box<dyn WebTool>> = vec![
            Box::new(BraveSearchTool::new(
                optional_api_key(BRAVE_SEARCH_API_KEY_VAR),
                config.search.country.as_str(),
                config.search.result_count,
            )),
            Box::new(FetchWebpageTool::new()),
        ];
        let search_agent = SearchAgent::new(
            OpenAiCompatibleProvider::openai(openai_key.clone(), &config.models.agent),
            config.models.agent.as_str(),
            tools,
        );

        // Carbon pipeline: embedder + catalogue + rerank model
        let lance = LanceVectorStore::new(data_dir.join("vector_store")).await?;
        let catalog = LanceCatalogStore::new(lance, EMBEDDING_MODEL_NAME);
        let embedder = FastEmbedder::new()?;
        let carbon = CarbonCalculator::new(
            OpenAiCompatibleProvider::openai(openai_key.clone(), &config.models.rerank),
            embedder,
            catalog,
            config.models.rerank.as_str(),
            config.carbon.saving_ratio,
            config.carbon.candidates,
        );

        // Image studio is optional: without a Google key the listing and
        // carbon features still work, only the image endpoints refuse.
        let image_studio = optional_api_key(GOOGLE_API_KEY_VAR).map(|google_key| {
            Arc::new(ImageStudio::new(
                OpenAiCompatibleProvider::openai(openai_key.clone(), &config.models.content),
                config.models.content.as_str(),
                GeminiImageClient::new(google_key, config.models.image.as_str()),
            ))
        });

        Ok(Self {
            vision: Arc::new(vision),
            content: Arc::new(content),
            selling: Arc::new(selling),
            seeking: Arc::new(seeking),
            search_agent: Arc::new(search_agent),
            carbon: Arc::new(carbon),
            image_studio,
            config,
            data_dir,
        })
    }
}
