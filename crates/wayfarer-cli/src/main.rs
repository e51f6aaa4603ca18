mod config;
mod extract_cmd;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use wayfarer_core::agent::AgentRegistry;
use wayfarer_core::config::GeneratorConfig;
use wayfarer_core::generator::OpenAiGenerator;
use wayfarer_core::schema::DomainKind;

use config::{CliOverrides, WayfarerConfig};

#[derive(Parser)]
#[command(name = "wayfarer", about = "Travel planning service backed by an LLM generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a wayfarer config file
    Init {
        /// OpenAI API key to store (falls back to OPENAI_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Start the HTTP API server
    Serve {
        /// Address to bind (default: 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (default: 8000)
        #[arg(long)]
        port: Option<u16>,
        /// OpenAI API key (overrides OPENAI_API_KEY and the config file)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Validate a saved generator output offline and print the envelope
    Extract {
        /// Domain the output belongs to: itinerary, events, restaurants
        #[arg(long)]
        domain: DomainKind,
        /// File holding the raw output (reads stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Execute the `wayfarer init` command: write config file.
fn cmd_init(api_key: Option<String>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let api_key = api_key.or_else(|| std::env::var("OPENAI_API_KEY").ok());

    let cfg = config::ConfigFile {
        generator: config::GeneratorSection {
            api_key: api_key.clone(),
            base_url: Some(GeneratorConfig::DEFAULT_BASE_URL.to_string()),
            model: Some(GeneratorConfig::DEFAULT_MODEL.to_string()),
            temperature: Some(GeneratorConfig::DEFAULT_TEMPERATURE),
            max_tokens: Some(GeneratorConfig::DEFAULT_MAX_TOKENS),
            timeout_secs: Some(GeneratorConfig::DEFAULT_TIMEOUT_SECS),
        },
        server: config::ServerSection::default(),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    match api_key.as_deref().map(mask_key) {
        Some(masked) => println!("  generator.api_key = {masked}"),
        None => {
            println!("  generator.api_key is not set");
            println!();
            println!("Next: add an API key to the config file or export OPENAI_API_KEY.");
            return Ok(());
        }
    }
    println!();
    println!("Next: run `wayfarer serve` to start the API.");

    Ok(())
}

/// Show only the ends of an API key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "<set>".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Execute the `wayfarer serve` command.
async fn cmd_serve(
    bind: Option<&str>,
    port: Option<u16>,
    api_key: Option<&str>,
) -> anyhow::Result<()> {
    let resolved = WayfarerConfig::resolve(&CliOverrides {
        api_key,
        bind,
        port,
    })?;
    tracing::debug!(config = ?resolved.generator, "resolved generator config");

    let generator = OpenAiGenerator::new(&resolved.generator)?;
    let registry = AgentRegistry::standard(Arc::new(generator), &resolved.generator);
    tracing::info!(domains = ?registry.kinds(), "agents ready");

    serve_cmd::run_serve(registry, &resolved.server).await
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| {
            std::env::var("LOG_LEVEL")
                .ok()
                .and_then(|level| tracing_subscriber::EnvFilter::try_new(level.to_lowercase()).ok())
        })
        .unwrap_or_else(|| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { api_key, force } => {
            cmd_init(api_key, force)?;
        }
        Commands::Serve {
            bind,
            port,
            api_key,
        } => {
            cmd_serve(bind.as_deref(), port, api_key.as_deref()).await?;
        }
        Commands::Extract { domain, file } => {
            let ok = extract_cmd::run_extract(domain, file.as_deref())?;
            if !ok {
                std::process::exit(1);
            }
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "wayfarer", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn extract_parses_domain() {
        let cli = Cli::try_parse_from(["wayfarer", "extract", "--domain", "events", "out.json"])
            .unwrap();
        match cli.command {
            Commands::Extract { domain, file } => {
                assert_eq!(domain, DomainKind::Events);
                assert_eq!(file, Some(PathBuf::from("out.json")));
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn mask_key_hides_the_middle() {
        assert_eq!(mask_key("sk-abcdefghijklmnop"), "sk-...mnop");
        assert_eq!(mask_key("short"), "<set>");
    }

    #[test]
    fn extract_rejects_unknown_domain() {
        assert!(Cli::try_parse_from(["wayfarer", "extract", "--domain", "flights"]).is_err());
    }

    #[test]
    fn serve_flags_are_optional() {
        let cli = Cli::try_parse_from(["wayfarer", "serve", "--port", "9001"]).unwrap();
        match cli.command {
            Commands::Serve { bind, port, api_key } => {
                assert!(bind.is_none());
                assert_eq!(port, Some(9001));
                assert!(api_key.is_none());
            }
            _ => panic!("expected serve"),
        }
    }
}
