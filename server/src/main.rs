//! Binary entry point: loads configuration, constructs every concrete
//! collaborator behind its trait object, wires them into an `Orchestrator`,
//! and serves the HTTP surface.

use clap::Parser;
use orchestrator::{CypherGenerator, DataCollector, Orchestrator, Planner, Synthesizer};
use orchestrator_adapter_neo4j::Neo4jStore;
use orchestrator_adapter_postgres::PostgresMetadataRegistry;
use orchestrator_adapter_qdrant::{HttpEmbeddingService, QdrantVectorSearch};
use orchestrator_connector_anthropic::AnthropicConnector;
use orchestrator_connector_prompt_registry::HttpPromptRegistry;
use orchestrator_core::cache::QueryResultCache;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "orchestrator-server", about = "Assistant orchestrator HTTP server")]
struct Args {
    /// Path to a YAML configuration file, merged under `ORCHESTRATOR_`-prefixed
    /// environment variables.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if let Err(err) = run(args).await {
        error!(error = %err, "server exited with an error");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = orchestrator_server::ServerConfig::load(&args.config)?;

    let metadata = Arc::new(PostgresMetadataRegistry::new(config.postgres.clone())?);
    let graph = Arc::new(Neo4jStore::new(config.neo4j.clone()).await?);
    let embeddings = Arc::new(HttpEmbeddingService::new(config.embedding.clone()));
    let vector = Arc::new(QdrantVectorSearch::new(
        config.qdrant.clone(),
        embeddings,
        config.orchestrator.vector_k_max,
    ));
    let prompts = Arc::new(HttpPromptRegistry::new(config.prompt_registry.clone()));
    let llm = Arc::new(AnthropicConnector::new(config.anthropic.clone())?);
    let cache = Arc::new(QueryResultCache::new(config.orchestrator.cache_ttl()));

    let planner = Planner::new(prompts.clone(), llm.clone(), config.orchestrator.planning_model.clone());
    let collector = DataCollector::new(vector);
    let cypher_gen = CypherGenerator::new(prompts.clone(), llm.clone(), config.orchestrator.cypher_model.clone());
    let synthesizer = Synthesizer::new(prompts, llm, config.orchestrator.synthesis_model.clone());

    let orchestrator = Arc::new(Orchestrator::new(
        metadata,
        graph.clone(),
        cache.clone(),
        planner,
        collector,
        cypher_gen,
        synthesizer,
        config.orchestrator.clone(),
    ));

    let state = orchestrator_server::AppState { orchestrator, graph, cache };
    let router = orchestrator_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    info!(address = %config.bind_address, "orchestrator server listening");
    axum::serve(listener, router).await?;

    Ok(())
}
