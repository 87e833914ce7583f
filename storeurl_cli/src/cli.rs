use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use storeurl_config::LoadedConfig;

#[derive(Parser, Debug)]
#[command(name = "storeurl")]
#[command(version, about = "Normalize cloud object store URLs and extract bucket/key", long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file with custom rewrites and grammars
    /// (default: ~/.config/storeurl/config.{yaml,yml,json})
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the canonical form of a URL
    Sanitize { url: String },

    /// Extract bucket and key from a URL, printed as JSON
    Parse {
        url: String,

        /// Print the matches of every applicable grammar
        #[arg(long)]
        all: bool,

        /// Fail if multiple grammars apply with differing results
        #[arg(long, conflicts_with = "all")]
        strict: bool,
    },

    /// Sanitize and parse a URL, printed as JSON
    Resolve {
        url: String,

        /// Fail if multiple grammars apply with differing results
        #[arg(long)]
        strict: bool,
    },

    /// Print the effective configuration, printed as JSON
    Config,
}

impl Cli {
    /// Run the command and return the text to print on stdout.
    pub async fn run(self) -> Result<String, anyhow::Error> {
        let loaded = storeurl_config::load_config_async(self.config).await?;
        let config = &loaded.config;

        match self.command {
            Command::Sanitize { url } => {
                tracing::info!(%url, "sanitizing URL");
                let sanitized = config.build_sanitizer()?.sanitize(&url);
                tracing::info!(%sanitized, "sanitized URL");
                Ok(sanitized)
            }
            Command::Parse { url, all, strict } => {
                let parser = config.build_parser()?.traced();
                let value = if all {
                    serde_json::to_value(parser.parse_all(&url))?
                } else if strict || config.strict {
                    serde_json::to_value(parser.parse_strict(&url)?)?
                } else {
                    serde_json::to_value(parser.parse(&url))?
                };
                to_json(&value)
            }
            Command::Resolve { url, strict } => {
                let resolver = config.build_resolver()?;
                let location = if strict || config.strict {
                    resolver.resolve_strict(&url)?
                } else {
                    resolver.resolve(&url)
                };
                to_json(&location)
            }
            Command::Config => to_json(&config_summary(&loaded)?),
        }
    }
}

fn config_summary(loaded: &LoadedConfig) -> Result<serde_json::Value, anyhow::Error> {
    let resolver = loaded
        .config
        .build_resolver()
        .with_context(|| format!("Invalid config '{}'", loaded.source))?;

    Ok(serde_json::json!({
        "source": loaded.source.to_string(),
        "strict": loaded.config.strict,
        "schemes": resolver.sanitizer().schemes(),
        "grammars": resolver.parser().kinds(),
    }))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, anyhow::Error> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}
