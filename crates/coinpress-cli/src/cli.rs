use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "coinpress")]
#[command(about = "Coinpress operations CLI: seed content and manage the badge cache")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the server configuration file
    #[arg(short, long, global = true, env = "COINPRESS_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed the database
    Seed(SeedArgs),
    /// Badge cache maintenance
    Cache(CacheArgs),
}

#[derive(clap::Args)]
pub struct SeedArgs {
    #[command(subcommand)]
    pub command: SeedCommands,
}

#[derive(Subcommand)]
pub enum SeedCommands {
    /// Create the demo writer, post, and coin
    Demo,
    /// Import coin holders from a tab-separated export
    Holders(HoldersArgs),
    /// Generate a comment thread on the demo post
    Comments(CommentsArgs),
}

#[derive(clap::Args)]
pub struct HoldersArgs {
    /// Path to the holder export: one `address<TAB>balance` row per line,
    /// header row skipped
    #[arg(long)]
    pub file: String,

    /// Coin price in USD, used to translate balances into badge tiers
    #[arg(long, default_value_t = 0.0004514)]
    pub token_price: f64,

    /// Wallet address to skip (repeatable; vaults, liquidity pools)
    #[arg(long)]
    pub exclude: Vec<String>,
}

#[derive(clap::Args)]
pub struct CommentsArgs {
    /// Number of comments to generate
    #[arg(long, default_value_t = 2000, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: u32,

    /// Post to attach comments to (defaults to the demo post)
    #[arg(long)]
    pub post: Option<String>,
}

#[derive(clap::Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Delete every cached badge entry
    Flush,
}
