use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use jammcli::{cli, config, error};

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
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Forget the stored Spotify credentials
    Logout,

    /// Search the Spotify catalog for tracks
    Search(SearchOptions),

    #[clap(about = "Save tracks as a new private playlist")]
    Playlist(PlaylistOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Search term
    pub term: String,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistOptions {
    /// Name of the playlist
    #[clap(long)]
    name: String,

    /// Track URI to add; can be repeated, order is kept
    #[clap(long = "track")]
    tracks: Vec<String>,

    /// Add tracks from a catalog search
    #[clap(long)]
    search: Option<String>,

    /// Number of search results to add
    #[clap(long, default_value_t = 10)]
    take: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command_for_update();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Command::Logout = cli.command {
        cli::logout().await;
        return;
    }

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    };

    let ctx = match cli::Context::new(config).await {
        Ok(ctx) => ctx,
        Err(e) => error!("{}", e),
    };

    match cli.command {
        Command::Auth => cli::auth(&ctx).await,
        Command::Search(opt) => cli::search(&ctx, opt.term).await,
        Command::Playlist(opt) => {
            cli::playlist(&ctx, opt.name, opt.tracks, opt.search, opt.take).await
        }
        Command::Logout | Command::Completions(_) => {}
    }
}
