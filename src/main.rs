use anyhow::Context;
use clap::Parser;
use lifeplan::api::{
    self,
    cli::{Cli, Command},
};
use lifeplan::core::simulate;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .with_context(|| format!("invalid log level {:?}", cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => api::run_http_server(args.into())
            .await
            .context("server error")?,
        Command::Simulate(args) => {
            let params = args.to_parameters().context("invalid parameters")?;
            let report = simulate(&params);
            let json = if args.pretty {
                serde_json::to_string_pretty(&report)
            } else {
                serde_json::to_string(&report)
            }
            .context("failed to encode simulation result")?;
            println!("{json}");
        }
        Command::Usage => print!("{}", api::usage_text()),
    }

    Ok(())
}
