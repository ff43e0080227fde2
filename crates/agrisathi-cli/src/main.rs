mod display;

use std::net::SocketAddr;
use std::path::PathBuf;

use agrisathi_ai::Classifier;
use agrisathi_api::ApiConfig;
use agrisathi_dashboard::DashboardConfig;
use agrisathi_feeds::{MarketConfig, WeatherConfig};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agrisathi", version, about = "Agricultural advisory services")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the image classification service.
    Serve {
        #[arg(long, env = "AGRISATHI_HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(short, long, env = "AGRISATHI_PORT", default_value_t = 5000)]
        port: u16,
        /// Classification model (ONNX) with an optional `<stem>.json` label file beside it.
        #[arg(long, env = "MODEL_PATH", default_value = "/models/plant-disease-model.onnx")]
        model_path: PathBuf,
        /// Maximum upload size in bytes.
        #[arg(long, default_value_t = 10 * 1024 * 1024)]
        body_limit: usize,
    },
    /// Run the advisory dashboard.
    Dashboard {
        #[arg(long, env = "AGRISATHI_HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(short, long, env = "AGRISATHI_PORT", default_value_t = 8501)]
        port: u16,
        /// OpenWeatherMap key; demo weather when unset.
        #[arg(long, env = "OWM_API_KEY")]
        owm_api_key: Option<String>,
        /// data.gov.in key; the public key when unset.
        #[arg(long, env = "DATA_GOV_API_KEY")]
        data_gov_api_key: Option<String>,
    },
    /// Classify one image file and print the result.
    Classify {
        image: PathBuf,
        #[arg(long, env = "MODEL_PATH", default_value = "/models/plant-disease-model.onnx")]
        model_path: PathBuf,
    },
    /// Print the advisory card for a crop.
    Crop {
        /// Crop name (Wheat, Rice, Maize, Sugarcane).
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve {
            host,
            port,
            model_path,
            body_limit,
        } => {
            let config = ApiConfig {
                model_path,
                body_limit,
            };
            info!(
                model = %config.model_path.display(),
                "agrisathi inference v{}",
                env!("CARGO_PKG_VERSION")
            );
            serve(&host, port, agrisathi_api::app(config)).await
        }
        Command::Dashboard {
            host,
            port,
            owm_api_key,
            data_gov_api_key,
        } => {
            let mut market = MarketConfig::default();
            if let Some(key) = data_gov_api_key.filter(|k| !k.trim().is_empty()) {
                market.api_key = key;
            }
            let config = DashboardConfig {
                weather: WeatherConfig {
                    api_key: owm_api_key,
                    ..Default::default()
                },
                market,
            };
            let app = agrisathi_dashboard::app(config).context("building dashboard")?;
            info!("agrisathi dashboard v{}", env!("CARGO_PKG_VERSION"));
            serve(&host, port, app).await
        }
        Command::Classify { image, model_path } => {
            let classifier = Classifier::load_onnx(&model_path)
                .with_context(|| format!("loading model {}", model_path.display()))?;
            let bytes = std::fs::read(&image)
                .with_context(|| format!("reading {}", image.display()))?;
            let result = classifier
                .classify_bytes(&bytes)
                .with_context(|| format!("classifying {}", image.display()))?;
            println!("{}", display::classification(&image, &result));
            Ok(())
        }
        Command::Crop { name } => {
            let record = agrisathi_core::crop(&name).with_context(|| {
                let known: Vec<_> = agrisathi_core::crop_names().collect();
                format!("unknown crop {name:?} (known: {})", known.join(", "))
            })?;
            print!("{}", display::crop_card(record));
            Ok(())
        }
    }
}

async fn serve(host: &str, port: u16, app: axum::Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
