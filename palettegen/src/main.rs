use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use palettegen::config::{Config, ProviderKind};
use palettegen::llm::colormind::ColormindClient;
use palettegen::palette::{is_hex_color, random, snippet, Hsl};
use palettegen::{FallbackResolver, PaletteError, Resolution, ThemeDescription};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "palettegen")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Generate color palettes at random or from a theme description",
    long_about = "Generate five-color palettes. Random palettes are computed locally; \
                  theme palettes are requested from LLM providers in fallback order."
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random palette
    Random {
        /// Build the palette around this base color (#rrggbb or #rgb)
        #[arg(short, long)]
        base: Option<String>,

        /// Number of colors (defaults to random.count from config)
        #[arg(short, long)]
        count: Option<usize>,

        /// Ask the Colormind API instead of generating locally
        #[arg(long, conflicts_with_all = ["base", "count"])]
        remote: bool,
    },

    /// Ask the configured AI providers for a palette matching a theme
    Ai {
        /// Theme description (e.g. "sunset", "soft pastels")
        #[arg(required = true, num_args = 1..)]
        theme: Vec<String>,

        /// Override the provider order (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        providers: Vec<ProviderKind>,
    },

    /// Print a CSS @theme snippet for a list of colors
    Snippet {
        /// Hex colors (#rrggbb)
        #[arg(required = true, num_args = 1..)]
        colors: Vec<String>,

        /// Custom property prefix
        #[arg(short, long, default_value = snippet::DEFAULT_PREFIX)]
        prefix: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file
    Init {
        /// Destination (defaults to ~/.config/palettegen/config.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Print the effective configuration with credentials redacted
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so palettes on stdout stay pipeable
    let filter = if cli.verbose {
        "palettegen=debug"
    } else {
        "palettegen=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Random {
            base,
            count,
            remote,
        } => run_random(cli.format, base, count, remote).await,
        Commands::Ai { theme, providers } => run_ai(cli.format, &theme.join(" "), providers).await,
        Commands::Snippet { colors, prefix } => run_snippet(&colors, &prefix),
        Commands::Config { action } => run_config(action),
    }
}

async fn run_random(
    format: OutputFormat,
    base: Option<String>,
    count: Option<usize>,
    remote: bool,
) -> Result<()> {
    let config = Config::load()?;

    if remote {
        let client = ColormindClient::new(&config.endpoints.colormind);
        let palette = client.fetch().await?;
        return write_colors(format, palette.colors(), None);
    }

    let count = count.unwrap_or(config.random.count);
    if count == 0 {
        bail!("--count must be at least 1");
    }

    let colors = match base {
        Some(hex) => {
            let base = Hsl::from_hex(&hex).ok_or(PaletteError::InvalidColor(hex))?;
            random::similar_palette(base, count)
        }
        None => random::random_colors(&mut rand::thread_rng(), count),
    };

    write_colors(format, &colors, None)
}

async fn run_ai(format: OutputFormat, theme: &str, providers: Vec<ProviderKind>) -> Result<()> {
    let theme = ThemeDescription::new(theme)?;
    let mut config = Config::load()?;
    if !providers.is_empty() {
        config.resolver.providers = providers;
    }
    let resolver = FallbackResolver::from_config(&config)?;

    tracing::debug!("Provider chain: {:?}", resolver.provider_names());

    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    match resolver.resolve_until(&theme, cancel).await {
        Ok(resolution) => write_resolution(format, &resolution),
        Err(PaletteError::Exhausted {
            message,
            rate_limited,
            ..
        }) => {
            if rate_limited {
                eprintln!("{}", palettegen::resolver::RATE_LIMIT_ADVISORY);
            }
            bail!(message)
        }
        Err(e) => Err(e.into()),
    }
}

fn run_snippet(colors: &[String], prefix: &str) -> Result<()> {
    if let Some(bad) = colors.iter().find(|c| !is_hex_color(c)) {
        bail!("Invalid hex color: {}", bad);
    }
    println!("{}", snippet::theme_snippet(colors, prefix));
    Ok(())
}

fn run_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init { path } => {
            let path = match path {
                Some(path) => path,
                None => Config::global_config_path()
                    .context("Could not determine home directory")?,
            };
            if path.exists() {
                bail!("Config file already exists: {}", path.display());
            }
            Config::create_default_config(&path)?;
            println!("Wrote default config to {}", path.display());
        }
        ConfigAction::Show => {
            let mut config = Config::load()?;
            let creds = &mut config.credentials;
            for secret in [
                &mut creds.github_token,
                &mut creds.gemini_api_key,
                &mut creds.openai_api_key,
                &mut creds.hf_token,
            ] {
                if secret.is_some() {
                    *secret = Some("********".to_string());
                }
            }
            print!(
                "{}",
                toml::to_string_pretty(&config).context("Failed to serialize config")?
            );
        }
    }
    Ok(())
}

fn write_colors(format: OutputFormat, colors: &[String], provider: Option<&str>) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "palette": colors,
                    "provider_used": provider,
                }))?
            );
        }
        OutputFormat::Text => {
            for color in colors {
                println!("{}", color);
            }
            if let Some(provider) = provider {
                eprintln!("AI used: {}", provider);
            }
        }
    }
    Ok(())
}

fn write_resolution(format: OutputFormat, resolution: &Resolution) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(resolution)?);
        }
        OutputFormat::Text => {
            write_colors(
                format,
                resolution.palette.colors(),
                Some(&resolution.provider_used),
            )?;
            if let Some(advisory) = resolution.advisory() {
                eprintln!("{}", advisory);
            }
        }
    }
    Ok(())
}
