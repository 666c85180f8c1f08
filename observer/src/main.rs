use ballpit_observer::{request_add_ball, start_client, LogRenderer};
use ballpit_shared::config::{DEFAULT_PORT, DEFAULT_SERVER_ADDRESS};
use ballpit_shared::mass::parse_mass;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut address = DEFAULT_SERVER_ADDRESS.to_string();
    let mut port = DEFAULT_PORT;
    let mut add_ball: Option<String> = None;
    let mut every: u64 = 100;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--address" => {
                i += 1;
                address = args.get(i).cloned().unwrap_or(address);
            }
            "--port" => {
                i += 1;
                port = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(port);
            }
            "--add-ball" => {
                i += 1;
                add_ball = args.get(i).cloned();
            }
            "--every" => {
                i += 1;
                every = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(every);
            }
            other => tracing::warn!("Ignoring unknown argument {}", other),
        }
        i += 1;
    }

    if let Some(input) = add_ball {
        let mass = parse_mass(&input)?;
        request_add_ball(&address, port, mass).await?;
        return Ok(());
    }

    let client = start_client(address, port, LogRenderer::new(every));
    tokio::signal::ctrl_c().await?;
    client.abort();
    Ok(())
}
