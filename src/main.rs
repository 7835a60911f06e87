use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use collageify::{
    cli,
    collage::{CollageConfig, SortKey, TimeRange},
    config, error,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the web app
    Serve(ServeOptions),

    /// Render a collage to a PNG file through a running server
    Collage(CollageOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Open the landing page in the default browser
    #[clap(long)]
    open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CollageOptions {
    /// Value of the ci_access_token cookie (falls back to CI_ACCESS_TOKEN)
    #[clap(long)]
    token: Option<String>,

    /// Origin of the running server (falls back to BASE_URL)
    #[clap(long)]
    base_url: Option<String>,

    /// Grid edge length
    #[clap(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=10))]
    size: u32,

    /// short_term, medium_term or long_term
    #[clap(long, default_value_t = TimeRange::ShortTerm)]
    time_range: TimeRange,

    /// popularity, release_date, album_name or most_played
    #[clap(long, default_value_t = SortKey::Popularity)]
    sort_by: SortKey,

    /// Keep only the first track of each album
    #[clap(long)]
    unique: bool,

    /// Print the selected tracks as a table
    #[clap(long)]
    list: bool,

    /// Directory the PNG is written to
    #[clap(long, default_value = ".")]
    out: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "collageify=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opt) => cli::serve(opt.open).await,
        Command::Collage(opt) => {
            let client = config::ClientConfig::from_env();
            let options = cli::CollageOptions {
                base_url: opt.base_url.unwrap_or(client.base_url),
                token: opt.token.or(client.token),
                config: CollageConfig {
                    size: opt.size,
                    time_range: opt.time_range,
                    sort_by: opt.sort_by,
                    unique_only: opt.unique,
                },
                list: opt.list,
                out: opt.out,
            };
            cli::collage(options).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
