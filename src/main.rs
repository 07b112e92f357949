//! Entry point for the valopro Discord bot.

use anyhow::Result;

mod app;
mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    app::runtime::run_bot().await
}
