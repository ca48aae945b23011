use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use vaultqa_cli::config::CliConfig;
use vaultqa_cli::settings::Settings;
use vaultqa_core::VerificationMode;
use vaultqa_llm::{OllamaClient, TextGenerator};
use vaultqa_planner::{AgentModule, PlannerExecutorModule};
use vaultqa_tools::{register_vault_tools, ToolRegistry, Vault};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliConfig::parse();
    let settings = Settings::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(settings.log_filter())),
        )
        .init();

    let notes = settings.validate().context("validating settings")?;
    info!("vault validated: {} ({notes} markdown notes)", settings.vault.path.display());

    let mut planning = settings.modules.planning.config.clone();
    if cli.strict {
        planning.verification_mode = VerificationMode::Strict;
    }

    let generator: Arc<dyn TextGenerator> = Arc::new(
        OllamaClient::new(
            &settings.model.ollama.base_url,
            settings.model.ollama.model.clone(),
            settings.ollama_options(),
            settings.request_timeout(),
        )
        .context("building ollama client")?,
    );
    info!(
        "model: {} via {}",
        settings.model.ollama.model, settings.model.ollama.base_url
    );

    let mut registry = ToolRegistry::new();
    let vault = Vault::new(settings.vault.path.clone(), settings.vault_limits());
    register_vault_tools(&mut registry, Arc::new(vault));
    info!("tools: {}", registry.names().join(", "));

    let mut module = PlannerExecutorModule::new(generator, Arc::new(registry), planning);
    if !settings.modules.planning.enabled {
        warn!("planning module disabled in settings; questions will not be answered");
        module.disable();
    }
    module.initialize().await;

    if let Some(question) = cli.question {
        println!("{}", module.ask(&question).await);
        return Ok(());
    }

    run_prompt_loop(&module).await
}

async fn run_prompt_loop(module: &PlannerExecutorModule) -> Result<()> {
    println!("Ask a question about your vault (exit, quit or q to leave).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n> ");
        std::io::stdout().flush().context("flushing stdout")?;

        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "exit" | "quit" | "q") {
            break;
        }

        let answer = module.ask(question).await;
        if answer.trim().is_empty() {
            error!("empty answer for question: {question}");
        }
        println!("\n{answer}");
    }
    info!("bye");
    Ok(())
}
