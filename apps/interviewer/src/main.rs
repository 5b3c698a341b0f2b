mod config;
mod db;
mod documents;
mod errors;
mod interview;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;
mod voice;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::interview::evaluator::AnswerEvaluator;
use crate::interview::questions::QuestionGenerator;
use crate::interview::session::SessionStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgInterviewStore;
use crate::store::{InterviewRepository, InterviewStore};
use crate::voice::{VoiceClient, VoiceSettings};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting interviewer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (optional)
    let store = match create_pool(config.database_url.as_deref()).await {
        Some(pool) => {
            let repo: Arc<dyn InterviewRepository> = Arc::new(PgInterviewStore::new(pool));
            InterviewStore::new(Some(repo))
        }
        None => InterviewStore::disabled(),
    };

    // Initialize model and voice clients (optional, share one credential)
    let (llm, voice) = match config.openai_api_key.clone() {
        Some(api_key) => {
            let llm = LlmClient::new(
                api_key.clone(),
                config.openai_base_url.clone(),
                config.chat_model.clone(),
            );
            info!("LLM client initialized (model: {})", llm.model());
            let voice = VoiceClient::new(
                api_key,
                config.openai_base_url.clone(),
                VoiceSettings {
                    tts_model: config.tts_model.clone(),
                    tts_voice: config.tts_voice.clone(),
                    stt_model: config.stt_model.clone(),
                },
            );
            (Some(llm), Some(voice))
        }
        None => {
            warn!("OPENAI_API_KEY not configured; using fallback questions and scores, voice disabled");
            (None, None)
        }
    };

    info!("Interviews run {} questions", config.total_questions);

    let state = AppState {
        sessions: SessionStore::default(),
        questions: QuestionGenerator::new(llm.clone()),
        evaluator: AnswerEvaluator::new(llm),
        voice,
        store,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
