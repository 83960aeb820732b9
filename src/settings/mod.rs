//! Settings come from a TOML file chosen with `--settings`, with
//! `AMITY__SECTION__KEY` environment variables layered on top.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
