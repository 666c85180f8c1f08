use ballpit_server::config::ServerConfig;
use ballpit_server::start_server;
use ballpit_shared::render::{LogRenderer, Renderer};
use tracing_subscriber::EnvFilter;

/// Log a summary line every this many snapshots
const SUMMARY_EVERY: u64 = 100;

fn parse_args(mut config: ServerConfig) -> ServerConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--listen" => {
                i += 1;
                if let Some(addr) = args.get(i) {
                    config.listen_addr = addr.clone();
                }
            }
            "--seed" => {
                i += 1;
                config.rng_seed = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(config.rng_seed);
            }
            "--balls" => {
                i += 1;
                config.seed_ball_count = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(config.seed_ball_count);
            }
            "--tick-ms" => {
                i += 1;
                config.tick_period_ms = args
                    .get(i)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(config.tick_period_ms);
            }
            other => tracing::warn!("Ignoring unknown argument {}", other),
        }
        i += 1;
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = parse_args(ServerConfig::default());
    let border = config.border;
    let server = start_server(config).await?;
    println!("Ballpit server listening on {}", server.local_addr());

    // Headless stand-in for the server-side view
    let mut frames = server.observe_local().await?;
    let renderer = tokio::spawn(async move {
        let mut renderer = LogRenderer::new(SUMMARY_EVERY);
        while let Some(snapshot) = frames.recv().await {
            renderer.render(&border, &snapshot.balls);
        }
    });

    tokio::signal::ctrl_c().await?;
    renderer.abort();
    server.stop();
    Ok(())
}
