use crate::catalog::{CatalogSnapshot, EndpointCatalog};
use crate::config::{ConfigSource, YamlConfigSource};
use crate::docs::{self, DocSynthesizer, SecuritySchemeCatalog, UnavailableDescriber};
use crate::executor::{EchoQueryExecutor, PolicyExecutor};
use crate::hot_reload::watch_config;
use crate::runtime_config::RuntimeConfig;
use crate::server::{GatewayService, HttpServer};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "flapi")]
#[command(version, about = "Configuration-driven API gateway", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the configured endpoints over HTTP
    Serve {
        #[arg(short, long, env = "FLAPI_CONFIG")]
        config: PathBuf,

        #[arg(long, default_value = "0.0.0.0:8080")]
        addr: String,

        #[arg(long, default_value_t = false)]
        watch: bool,

        #[arg(long)]
        base_url: Option<String>,
    },
    /// Validate the configuration and list its routes
    Routes {
        #[arg(short, long, env = "FLAPI_CONFIG")]
        config: PathBuf,
    },
    /// Print the OpenAPI document for the configuration
    Openapi {
        #[arg(short, long, env = "FLAPI_CONFIG")]
        config: PathBuf,

        #[arg(long, value_enum, default_value_t = DocFormat::Json)]
        format: DocFormat,

        #[arg(long, default_value = "http://localhost:8080")]
        base_url: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocFormat {
    Json,
    Yaml,
}

/// One line per endpoint: method, template, and enabled policies.
pub fn render_routes(snapshot: &CatalogSnapshot) -> String {
    let mut out = String::new();
    for entry in snapshot.entries() {
        let endpoint = &entry.endpoint;
        let mut policies = Vec::new();
        if endpoint.auth.enabled {
            policies.push(format!("auth={}", endpoint.auth.scheme.scheme_name()));
        }
        if endpoint.rate_limit.enabled {
            policies.push(format!(
                "rate-limit={}/{}s",
                endpoint.rate_limit.max, endpoint.rate_limit.interval
            ));
        }
        out.push_str(&format!("{:<7} {}", endpoint.method.as_str(), endpoint.url_path));
        if !policies.is_empty() {
            out.push_str(&format!("  [{}]", policies.join(", ")));
        }
        out.push('\n');
    }
    out
}

pub fn render_openapi(
    catalog: Arc<EndpointCatalog>,
    base_url: &str,
    format: DocFormat,
) -> anyhow::Result<String> {
    let synthesizer = DocSynthesizer::new(catalog, Arc::new(UnavailableDescriber));
    let doc = synthesizer.synthesize(base_url, &SecuritySchemeCatalog::standard());
    match format {
        DocFormat::Json => docs::to_json(&doc).context("failed to render OpenAPI JSON"),
        DocFormat::Yaml => docs::to_yaml(&doc).context("failed to render OpenAPI YAML"),
    }
}

pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve {
            config,
            addr,
            watch,
            base_url,
        } => {
            RuntimeConfig::from_env().apply();

            let source: Arc<dyn ConfigSource> = Arc::new(YamlConfigSource::new(&config));
            let catalog = Arc::new(EndpointCatalog::load(source.as_ref())?);
            let executor = Arc::new(PolicyExecutor::new(Arc::new(EchoQueryExecutor)));

            let mut service = GatewayService::new(
                Arc::clone(&catalog),
                Arc::clone(&source),
                executor,
                Arc::new(UnavailableDescriber),
            );
            if let Some(base_url) = base_url {
                service = service.with_base_url(base_url);
            }

            // Dropping the watcher stops reloads, so it lives until the server exits
            let _watcher = if watch {
                Some(
                    watch_config(&config, Arc::clone(&catalog), source)
                        .context("failed to watch configuration file")?,
                )
            } else {
                None
            };

            let handle = HttpServer(service)
                .start(addr.as_str())
                .with_context(|| format!("failed to bind {addr}"))?;
            info!(addr = %handle.addr(), endpoints_count = catalog.snapshot().len(), "flapi serving");
            handle
                .join()
                .map_err(|e| anyhow::anyhow!("server coroutine panicked: {e:?}"))
        }
        Commands::Routes { config } => {
            let catalog = EndpointCatalog::load(&YamlConfigSource::new(&config))?;
            print!("{}", render_routes(&catalog.snapshot()));
            Ok(())
        }
        Commands::Openapi {
            config,
            format,
            base_url,
        } => {
            let catalog = Arc::new(EndpointCatalog::load(&YamlConfigSource::new(&config))?);
            println!("{}", render_openapi(catalog, &base_url, format)?);
            Ok(())
        }
    }
}
