use oneseed::config::{Config, CorpusLocation};
use oneseed::routes::{self, AppState};
use oneseed::services::corpus::{CorpusSource, FsCorpus, HttpCorpus};
use oneseed::services::providers::{BibleApiProvider, OurMannaProvider};
use oneseed::services::remote::RemoteVerses;
use oneseed::services::resolver::VerseResolver;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::from_env()?;

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .build()?;

    // Local corpus: a directory we also publish, or a remote static host
    let source: Arc<dyn CorpusSource> = match &config.corpus {
        CorpusLocation::Dir(root) => Arc::new(FsCorpus::new(root.join(&config.translation))),
        CorpusLocation::Url(base) => {
            let base = format!("{}/{}", base.trim_end_matches('/'), config.translation);
            Arc::new(HttpCorpus::new(client.clone(), base))
        }
    };
    let published_dir = match &config.corpus {
        CorpusLocation::Dir(root) => Some(root.clone()),
        CorpusLocation::Url(_) => None,
    };
    tracing::info!("Reading corpus from {}", source.describe());

    let resolver = VerseResolver::new(source).with_min_total_verses(config.min_total_verses);

    let remote = RemoteVerses::new(
        Arc::new(BibleApiProvider::new(client.clone(), &config.bible_api_url)?),
        Arc::new(OurMannaProvider::new(client, &config.ourmanna_url)?),
    );

    let app_state = AppState {
        resolver: Arc::new(resolver),
        remote: Arc::new(remote),
    };
    let app = routes::router(app_state, published_dir);

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
