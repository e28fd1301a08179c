use clap::ValueHint;

use std::path::PathBuf;

#[derive(clap::Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Path to the config file.
    ///
    /// By default, readme-cards looks for a file named `readme-cards.toml` in the following
    /// directories (in order):
    ///
    /// - `./` (the current directory)
    /// - `/etc`
    #[arg(
        short,
        env = "READMECARDS_CONFIG",
        value_hint(ValueHint::FilePath)
    )]
    pub config_path: Option<PathBuf>,

    /// HTTP server address to bind to.
    #[arg(long, env = "READMECARDS_BIND_ADDR")]
    pub bind_addr: Option<String>,

    /// URL of the RSS-to-JSON API.
    #[arg(long, env = "READMECARDS_FEED_API_URL", value_hint(ValueHint::Url))]
    pub feed_api_url: Option<String>,

    /// Inline avatars into the cards instead of linking to them.
    #[arg(long)]
    pub embed_avatar: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch a user's feed once, print it, and exit.
    Fetch {
        /// Medium username (without the `@`).
        username: String,
    },
}

impl Args {
    pub fn parse() -> Self {
        clap::Parser::parse()
    }
}
