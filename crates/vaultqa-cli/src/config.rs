use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "vaultqa", about = "Ask questions about a markdown vault")]
pub struct CliConfig {
    /// Path to the YAML settings file
    #[arg(long, env = "VAULTQA_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Answer a single question and exit instead of starting the prompt loop
    #[arg(long, short)]
    pub question: Option<String>,

    /// Abort a plan on its first failed tool call
    #[arg(long)]
    pub strict: bool,
}
