use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{self as sdk, Resource};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,tower_http=warn,sqlx=warn";

static PROVIDER: OnceCell<Option<sdk::trace::SdkTracerProvider>> = OnceCell::new();

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Configuration for tracing initialization.
#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    pub env_filter: Option<String>,
    pub format: LogFormat,
    pub otlp_endpoint: Option<String>,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            service_name: "aurora-hr",
            env_filter: None,
            format: LogFormat::Pretty,
            otlp_endpoint: None,
        }
    }
}

impl ObsConfig {
    /// Reads `RUST_LOG`, `LOG_FORMAT` and `OTLP_ENDPOINT`.
    pub fn from_env() -> Self {
        Self {
            env_filter: std::env::var("RUST_LOG").ok(),
            format: std::env::var("LOG_FORMAT")
                .map(|raw| LogFormat::parse(&raw))
                .unwrap_or_default(),
            otlp_endpoint: std::env::var("OTLP_ENDPOINT")
                .ok()
                .filter(|endpoint| !endpoint.trim().is_empty()),
            ..Self::default()
        }
    }
}

/// Install tracing subscribers with optional OTLP exporter. Safe to call
/// more than once; only the first call installs anything.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    if PROVIDER.get().is_some() {
        return Ok(());
    }

    let filter = config
        .env_filter
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());
    let env_filter = EnvFilter::try_new(filter)?;

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(false).boxed(),
    };

    let provider = match config.otlp_endpoint {
        Some(endpoint) => {
            let exporter = SpanExporter::builder()
                .with_http()
                .with_protocol(Protocol::HttpBinary)
                .with_endpoint(endpoint)
                .build()?;
            let resource = Resource::builder()
                .with_service_name(config.service_name)
                .build();
            Some(
                sdk::trace::SdkTracerProvider::builder()
                    .with_resource(resource)
                    .with_batch_exporter(exporter)
                    .build(),
            )
        }
        None => None,
    };
    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name))
    });

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .with(otel_layer)
        .try_init()?;

    PROVIDER
        .set(provider)
        .map_err(|_| anyhow!("tracing already initialized"))?;
    Ok(())
}

/// Flush and stop the OTLP exporter, if one was installed.
pub fn shutdown_tracing() {
    if let Some(Some(provider)) = PROVIDER.get() {
        if let Err(err) = provider.shutdown() {
            eprintln!("failed to flush traces: {err}");
        }
    }
}
