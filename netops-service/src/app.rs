//! Component wiring from `AppConfig`

use anyhow::{Context, Result};
use netops_chat::{
    prompt::AGENT_SYSTEM_PROMPT, Assistant, ChatState, Dispatcher, DispatcherConfig,
    HistoryPolicy, InteractionLog, LogAnalyzer, SessionManager,
};
use netops_core::AppConfig;
use netops_llm::{ChatModel, ModelId, OpenAiProvider};
use netops_network::{Inventory, PingProber};
use netops_rag::{IndexBackend, KnowledgeBase, OpenAiEmbedder};
use netops_tools::{build_network_registry, NetworkToolContext, ToolRegistry, ToolsState};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Long-lived components shared by every surface
pub struct App {
    pub config: AppConfig,
    pub model_id: ModelId,
    pub inventory: Arc<Inventory>,
    pub knowledge: Arc<KnowledgeBase>,
    pub registry: Arc<ToolRegistry>,
}

impl App {
    pub async fn build(config: AppConfig) -> Result<Self> {
        let model_id: ModelId = config.model.parse()?;

        let inventory = match &config.inventory_file {
            Some(path) => Inventory::load(path)
                .await
                .with_context(|| format!("loading inventory {}", path.display()))?,
            None => Inventory::builtin()?,
        };
        info!(
            devices = inventory.directory.len(),
            switches = inventory.vlans.device_count().await,
            "Inventory loaded"
        );
        let inventory = Arc::new(inventory);

        let knowledge = Arc::new(KnowledgeBase::new(index_backend(&config)?));

        let prober = PingProber::new(
            config.ping_count,
            Duration::from_secs(config.ping_timeout_secs),
        );
        let ctx = NetworkToolContext::new(inventory.clone(), Arc::new(prober), knowledge.clone())
            .with_top_k(config.top_k);
        let registry = Arc::new(build_network_registry(&ctx)?);
        info!(tools = registry.len(), "Tool registry initialized");

        Ok(Self {
            config,
            model_id,
            inventory,
            knowledge,
            registry,
        })
    }

    /// Index the documentation directory; a failure leaves the knowledge base empty
    pub async fn index_docs(&self) {
        match self.knowledge.index_directory(&self.config.docs_dir).await {
            Ok(report) => info!(
                documents = report.documents,
                chunks = report.chunks,
                backend = %report.backend,
                elapsed_ms = report.elapsed_ms,
                "Documentation indexed"
            ),
            Err(e) => warn!(
                dir = %self.config.docs_dir.display(),
                error = %e,
                "Documentation not indexed, lookup_docs stays unavailable"
            ),
        }
    }

    /// Chat model from the configured endpoint
    pub fn chat_model(&self) -> Result<Arc<dyn ChatModel>> {
        let api_key = self
            .config
            .openai_api_key
            .clone()
            .context("OPENAI_API_KEY is not set")?;
        let provider = OpenAiProvider::with_base_url(api_key, &self.config.openai_base_url)?;
        Ok(Arc::new(provider))
    }

    pub fn assistant(&self, model: Arc<dyn ChatModel>) -> Assistant {
        let dispatcher = Dispatcher::new(model, self.registry.clone()).with_config(DispatcherConfig {
            model: self.model_id,
            temperature: self.config.temperature,
            max_iterations: self.config.max_iterations,
        });
        let sessions = SessionManager::with_max_sessions(self.config.max_sessions)
            .with_system(AGENT_SYSTEM_PROMPT)
            .with_policy(HistoryPolicy::from_ceiling(self.config.token_ceiling));

        let assistant = Assistant::new(
            dispatcher,
            Arc::new(sessions),
            self.knowledge.clone(),
            self.config.docs_dir.clone(),
        );
        match &self.config.history_log {
            Some(path) => assistant.with_interaction_log(InteractionLog::new(path)),
            None => assistant,
        }
    }

    pub fn analyzer(&self, model: Arc<dyn ChatModel>) -> LogAnalyzer {
        LogAnalyzer::new(model, self.model_id).with_temperature(self.config.analysis_temperature)
    }

    pub fn tools_state(&self) -> ToolsState {
        ToolsState::new(self.registry.clone())
    }

    pub fn chat_state(&self, model: Arc<dyn ChatModel>) -> ChatState {
        ChatState::new(
            Arc::new(self.assistant(model.clone())),
            Arc::new(self.analyzer(model)),
        )
    }
}

fn index_backend(config: &AppConfig) -> Result<IndexBackend> {
    let Some(model) = &config.embedding_model else {
        return Ok(IndexBackend::Lexical);
    };
    match &config.openai_api_key {
        Some(api_key) => {
            let embedder = OpenAiEmbedder::new(api_key.clone(), config.openai_base_url.clone())?
                .with_model(model.clone());
            info!(model = %model, "Using embedding index");
            Ok(IndexBackend::Embedding(Arc::new(embedder)))
        }
        None => {
            warn!(model = %model, "Embedding model configured without OPENAI_API_KEY, using lexical index");
            Ok(IndexBackend::Lexical)
        }
    }
}
