//! Intercom Auto-Translator — Binary Entrypoint
//! Boots the Axum HTTP server, wiring configuration, the provider chain,
//! and the webhook pipeline.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use intercom_auto_translator::api::{create_router, AppState};
use intercom_auto_translator::config::AppConfig;
use intercom_auto_translator::metrics::Metrics;
use intercom_auto_translator::pipeline::Pipeline;
use intercom_auto_translator::publish::{IntercomSink, NotePublisher};
use intercom_auto_translator::translate::providers::{
    GoogleWebProvider, LibreTranslateProvider, MyMemoryProvider, TranslateProvider,
};
use intercom_auto_translator::translate::Translator;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("intercom_auto_translator=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Ordered provider chain: the keyless Google web endpoint first (best
/// quality, worst rate limits), then LibreTranslate, then MyMemory.
fn build_providers(cfg: &AppConfig) -> Vec<Box<dyn TranslateProvider>> {
    vec![
        Box::new(GoogleWebProvider::new(cfg.provider_timeout_secs)),
        Box::new(LibreTranslateProvider::new(
            &cfg.libretranslate_url,
            cfg.libretranslate_api_key.clone(),
            cfg.provider_timeout_secs,
        )),
        Box::new(MyMemoryProvider::new(cfg.provider_timeout_secs)),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Missing credentials abort startup; everything past this point is
    // per-event and non-fatal.
    let cfg = AppConfig::from_env()?;

    let metrics = Metrics::init(cfg.cache_ttl_secs);

    let translator = Translator::new(
        build_providers(&cfg),
        &cfg.target_lang,
        &cfg.skip_langs,
        cfg.cache_ttl_secs,
    );
    let sink = Arc::new(IntercomSink::new(
        &cfg.intercom_api_base,
        &cfg.intercom_token,
        &cfg.admin_id,
    ));
    let publisher = NotePublisher::new(sink);
    let pipeline = Arc::new(Pipeline::new(&cfg, translator, publisher));

    let router = create_router(AppState { pipeline }).merge(metrics.router());

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, enabled = cfg.enabled, "server listening");
    axum::serve(listener, router).await?;

    Ok(())
}
