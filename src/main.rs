use anyhow::Result;
use clap::Parser;
use nutrigym::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    nutrigym::run(args).await
}
