//! auto-commit-message - CLI entry point.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use auto_commit_message::clipboard::copy_to_clipboard;
use auto_commit_message::diff::collect_staged_diff;
use auto_commit_message::{
    Config, HealthProbe, InferenceServerManager, InputError, NoiseFiles, OllamaClient,
    OllamaSupervisor, generate_commit_message,
};

/// Generate a commit message from a git diff using a local Ollama model.
#[derive(Parser, Debug)]
#[command(name = "auto-commit-message")]
#[command(about = "Generate a commit message from a git diff using a local Ollama model")]
#[command(version)]
struct Cli {
    /// Optional path to a file with the git diff (defaults to stdin)
    #[arg(long, conflicts_with = "staged")]
    diff: Option<PathBuf>,

    /// Read the staged changes of the current repository instead of stdin
    #[arg(long)]
    staged: bool,

    /// Ollama model to use (overrides AUTO_COMMIT_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature (overrides AUTO_COMMIT_TEMPERATURE)
    #[arg(long)]
    temperature: Option<f32>,

    /// File to leave out of the prompt; repeat for more (replaces the defaults)
    #[arg(long = "noise-file", value_name = "PATH")]
    noise_files: Vec<String>,

    /// Print the message without copying it to the clipboard
    #[arg(long)]
    no_copy: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(&cli);

    // Step 1: Read and validate the diff before touching the server
    let diff_text = read_diff(&cli)?;

    // Step 2: Wire up the server manager and model client
    let probe = HealthProbe::new(&config.base_url());
    let supervisor = OllamaSupervisor::new(&config.binary, config.listen_addr(), probe);
    let mut manager = InferenceServerManager::new(supervisor, config.startup_timeout);
    let client = OllamaClient::new(
        config.base_url(),
        &config.model,
        config.temperature,
        config.inference_timeout,
    )
    .context("Failed to create Ollama client")?;

    // Step 3: Generate, honoring Ctrl-C
    let outcome = tokio::select! {
        result = generate_commit_message(&mut manager, &client, &diff_text, &config.noise_files) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let message = match outcome {
        Some(result) => result.context("Failed to generate commit message")?,
        None => {
            eprintln!("Interrupted.");
            manager
                .stop_if_owned()
                .await
                .context("Failed to stop Ollama server")?;
            std::process::exit(130);
        }
    };

    // Step 4: Print and copy
    println!("Generated Commit Message: {}", message);

    if !cli.no_copy
        && let Err(e) = copy_to_clipboard(&message)
    {
        eprintln!("Warning: Could not copy to clipboard: {}", e);
    }

    Ok(())
}

/// Install the fmt subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "auto_commit_message=debug,warn"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Environment configuration with CLI overrides applied.
fn resolve_config(cli: &Cli) -> Config {
    let mut config = Config::from_env();
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(temperature) = cli.temperature {
        config.temperature = temperature;
    }
    if !cli.noise_files.is_empty() {
        config.noise_files = cli.noise_files.iter().cloned().collect::<NoiseFiles>();
    }
    config
}

/// Read the diff from `--diff`, `--staged`, or stdin.
fn read_diff(cli: &Cli) -> Result<String, InputError> {
    let text = if let Some(path) = &cli.diff {
        read_diff_file(path)?
    } else if cli.staged {
        collect_staged_diff(Path::new("."))?
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(InputError::ReadStdin)?;
        buf
    };

    validate_diff(text)
}

fn read_diff_file(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|source| InputError::ReadFile {
        path: path.display().to_string(),
        source,
    })
}

/// Reject empty or whitespace-only input.
fn validate_diff(text: String) -> Result<String, InputError> {
    if text.trim().is_empty() {
        return Err(InputError::Empty);
    }
    Ok(text)
}
