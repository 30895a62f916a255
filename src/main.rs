use anyhow::Result;
use api_devtool::llm::GeminiClient;
use api_devtool::models::ApiRequest;
use api_devtool::scraper::HttpFetcher;
use api_devtool::{Config, Orchestrator, web};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "api-devtool")]
#[command(about = "Analyze API documentation and generate wrapper code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a documentation page and print the result as JSON
    Analyze {
        /// URL of the API documentation
        #[arg(short, long)]
        url: String,
        /// Brief description of the intended use case
        #[arg(long)]
        use_case: String,
        /// Programming language for the wrapper class
        #[arg(short, long, default_value = "Python")]
        language: String,
    },
    /// Start the web interface
    Serve {
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(Config::from_env()?);
    let orchestrator = Orchestrator::new(
        config.clone(),
        Arc::new(HttpFetcher::new(config.fetch_timeout)?),
        Arc::new(GeminiClient::from_config(&config)?),
    );

    match cli.command {
        Commands::Analyze {
            url,
            use_case,
            language,
        } => {
            let request = ApiRequest {
                documentation_url: url,
                use_case,
                preferred_language: language,
            };
            let result = orchestrator.analyze(&request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Serve { port } => {
            web::run_server(port, orchestrator).await?;
        }
    }

    Ok(())
}
