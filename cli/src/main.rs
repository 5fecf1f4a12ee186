mod args;
mod config;
mod flow;
mod http;
mod render;
mod shell;

use anyhow::bail;
use tracing::info;
use tracing_subscriber::EnvFilter;

use args::Command;
use http::HttpClient;
use shell::Shell;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so views on stdout stay pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = args::parse(std::env::args().skip(1))?;
    let config = config::from_env()?;

    match cli.command {
        Command::Help => println!("{}", args::USAGE),
        Command::Health => {
            let mut shell = Shell::new(HttpClient::new(), None, cli.json)?;
            flow::start(&mut shell, config).await?;
            if !flow::health(&mut shell).await? {
                bail!("backend is not reachable");
            }
        }
        Command::Analyze(analyze) => {
            info!(image = %analyze.image.display(), "analyzing");
            let mut shell = Shell::new(HttpClient::new(), Some(&analyze.image), cli.json)?;
            flow::start(&mut shell, config).await?;
            flow::analyze(&mut shell, &analyze).await?;
        }
    }
    Ok(())
}
