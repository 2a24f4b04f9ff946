//! Commit message generation: filter the diff, ask the model, clean the reply.

use tracing::{debug, info, warn};

use crate::diff::{NoiseFiles, filter_diff};
use crate::error::GenerateError;
use crate::llm::{InferenceClient, SYSTEM_PROMPT, clean_response};
use crate::server::{InferenceServerManager, ProcessSupervisor};

/// Generate a commit message for `diff_text`.
///
/// Whether a server was running before this call is snapshotted first. If
/// none was, the server is stopped afterwards whatever the outcome, so a
/// server spawned here never outlives the request. A failed stop is logged
/// and does not replace the generation result.
pub async fn generate_commit_message<S, C>(
    server: &mut InferenceServerManager<S>,
    client: &C,
    diff_text: &str,
    noise_files: &NoiseFiles,
) -> Result<String, GenerateError>
where
    S: ProcessSupervisor,
    C: InferenceClient + ?Sized,
{
    let already_running = server.current_pid().await.is_some();
    debug!("Server running before request: {}", already_running);

    let result = run_generation(server, client, diff_text, noise_files).await;

    if !already_running
        && let Err(e) = server.stop_if_owned().await
    {
        warn!("Failed to stop inference server: {}", e);
    }

    result
}

async fn run_generation<S, C>(
    server: &mut InferenceServerManager<S>,
    client: &C,
    diff_text: &str,
    noise_files: &NoiseFiles,
) -> Result<String, GenerateError>
where
    S: ProcessSupervisor,
    C: InferenceClient + ?Sized,
{
    server.ensure_started().await?;

    let filtered = filter_diff(diff_text, noise_files);
    if filtered.noted_omission {
        info!("Left out of the prompt: {}", filtered.omitted.join(", "));
    }
    if filtered.filtered_text.is_empty() {
        warn!("Nothing left to summarize after filtering noise files");
    }

    let raw = client
        .complete(SYSTEM_PROMPT, &filtered.filtered_text)
        .await?;
    debug!("Raw model response: {}", raw);

    Ok(clean_response(&raw, filtered.noted_omission))
}
