use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone, PartialEq, Eq)]
#[command(name = "nutrigym")]
#[command(
    about = "Fitness and nutrition assistant tools, one call per invocation",
    long_about = "Fitness and nutrition assistant tools, one call per invocation.\n\nEach run executes a single tool and prints a JSON envelope ({ok, result} or\n{ok:false, error}) on stdout, which is the contract the conversational\norchestrator consumes.\n\nConfig file loading:\n  - --config <path> (explicit file, overrides default path discovery)\n  - Default probe path when --config is not provided:\n    1. $XDG_CONFIG_HOME/nutrigym/config.toml\n    2. ~/.config/nutrigym/config.toml"
)]
pub struct CliArgs {
    /// Tool to invoke; use `list-tools` to print the declared tool set.
    pub tool: String,

    /// Tool arguments as a JSON object.
    #[arg(long, value_name = "JSON", default_value = "{}")]
    pub args: String,

    /// Load config from this file path instead of the default discovery path.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log redacted HTTP request/response traffic to stderr.
    #[arg(long)]
    pub verbose: bool,
}
