use std::pin::pin;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::TryStreamExt;
use learnosity_sdk::{
    DataApi, DataApiConfig, HmacSha256Scheme, RequestPacket, SecurityPacket, Service,
    Sha256Scheme, SignatureScheme, SignerEngine, disable_telemetry,
};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, ValueEnum)]
enum SignatureAlgorithm {
    Sha256,
    HmacSha256,
}

impl SignatureAlgorithm {
    fn scheme(&self) -> Arc<dyn SignatureScheme> {
        match self {
            Self::Sha256 => Arc::new(Sha256Scheme),
            Self::HmacSha256 => Arc::new(HmacSha256Scheme),
        }
    }
}

#[derive(Parser)]
#[clap(name = "learnosity", about = "Sign Learnosity init options and query the Data API")]
struct Args {
    #[clap(long, env = "LEARNOSITY_CONSUMER_KEY", default_value = "")]
    consumer_key: String,
    #[clap(long, env = "LEARNOSITY_CONSUMER_SECRET", hide_env_values = true, default_value = "")]
    consumer_secret: String,
    #[clap(long, env = "LEARNOSITY_DOMAIN", default_value = "localhost")]
    domain: String,
    #[clap(long, env = "LEARNOSITY_SIGNATURE_ALGORITHM", default_value = "sha256")]
    signature_algorithm: SignatureAlgorithm,
    /// Do not attach SDK metadata to requests.
    #[clap(long)]
    no_telemetry: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the signed init options for a service.
    Sign {
        /// items, assess, questions, author, reports, authoraide or data.
        service: String,
        /// Request as JSON.
        #[clap(long, default_value = "{}")]
        request: String,
        /// Echo the request back as a string, as if it was passed pre-encoded.
        #[clap(long)]
        encoded: bool,
        #[clap(long)]
        action: Option<String>,
        #[clap(long)]
        user_id: Option<String>,
        /// Use a random UUID as the user id.
        #[clap(long, conflicts_with = "user_id")]
        anonymous_user: bool,
        /// Fixed `YYYYMMDD-HHmm` timestamp instead of the current time.
        #[clap(long)]
        timestamp: Option<String>,
    },
    /// Call a Data API endpoint and print its results as JSON lines.
    Data {
        /// Resource path such as `itembank/items`.
        resource: String,
        #[clap(long, default_value = "{}")]
        request: String,
        #[clap(long, default_value = "get")]
        action: String,
        /// Print whole pages instead of individual results.
        #[clap(long)]
        pages: bool,
        /// Fetch only the first page.
        #[clap(long, conflicts_with = "max_pages")]
        single: bool,
        #[clap(long, env = "LEARNOSITY_MAX_PAGES")]
        max_pages: Option<usize>,
        #[clap(long, env = "LEARNOSITY_DATA_URL", default_value = "https://data.learnosity.com")]
        base_url: String,
        #[clap(long, env = "LEARNOSITY_DATA_VERSION", default_value = "v2023.1.LTS")]
        version: String,
        #[clap(long, env = "LEARNOSITY_TIMEOUT", default_value = "30")]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.no_telemetry {
        disable_telemetry();
    }
    let engine = SignerEngine::new().with_scheme(args.signature_algorithm.scheme());

    match args.command {
        Command::Sign {
            service,
            request,
            encoded,
            action,
            user_id,
            anonymous_user,
            timestamp,
        } => {
            let request = parse_request(&request, encoded)?;
            let mut security = SecurityPacket::new(args.consumer_key, args.domain);
            security.user_id = if anonymous_user {
                Some(learnosity_sdk::uuid::generate())
            } else {
                user_id
            };
            security.timestamp = timestamp;

            let output = engine.init(
                &Service::from(service.as_str()),
                &mut security,
                &args.consumer_secret,
                request,
                action.as_deref(),
            );
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Data {
            resource,
            request,
            action,
            pages,
            single,
            max_pages,
            base_url,
            version,
            timeout,
        } => {
            let config = DataApiConfig::new(&args.consumer_key, &args.consumer_secret, &args.domain)
                .with_base_url(base_url)
                .with_version(version)
                .with_timeout_secs(timeout)
                .with_max_pages(max_pages);
            let api = DataApi::new(config.clone())
                .context("failed to create Data API client")?
                .with_engine(engine);
            let endpoint = config.endpoint(&resource);
            let request = parse_request(&request, false)?;
            let security = api.security_packet();

            info!(endpoint = %endpoint, action = %action, "querying data api");

            if single {
                let mut security = security;
                let response = api
                    .request(&endpoint, &mut security, &args.consumer_secret, request, &action)
                    .await
                    .context("data api request failed")?;
                println!("{}", response.text());
            } else if pages {
                let mut stream = pin!(api.request_iter(
                    &endpoint,
                    &security,
                    &args.consumer_secret,
                    request,
                    &action,
                ));
                while let Some(page) = stream.try_next().await.context("failed to fetch page")? {
                    println!("{}", serde_json::to_string(&page)?);
                }
            } else {
                let mut stream = pin!(api.results_iter(
                    &endpoint,
                    &security,
                    &args.consumer_secret,
                    request,
                    &action,
                ));
                while let Some(result) = stream.try_next().await.context("failed to fetch results")? {
                    println!("{result}");
                }
            }
        }
    }

    Ok(())
}

fn parse_request(raw: &str, encoded: bool) -> Result<RequestPacket> {
    if encoded {
        return RequestPacket::encoded(raw).context("--request is not valid JSON");
    }
    let value: Value = serde_json::from_str(raw).context("--request is not valid JSON")?;
    Ok(RequestPacket::from(value))
}
