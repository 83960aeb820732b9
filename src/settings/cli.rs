use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "amity", about = "Friend request and block ledger over HTTP")]
pub struct Cli {
    /// Path to a settings TOML file.
    #[arg(long)]
    pub settings: Option<String>,
}
