//! External text generators.
//!
//! The workflow treats content and plan generation as a black box:
//! `generate(prompt) -> text`. [`CommandGenerator`] runs a CLI (by default
//! `claude --print`) with the prompt on stdin and returns its stdout.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::GenerationError;
use crate::util::extract_json_object;

/// Produces text for a prompt.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Ask `generator` for JSON and deserialize the outermost object of its reply.
pub async fn generate_json<T: DeserializeOwned>(
    generator: &dyn ContentGenerator,
    prompt: &str,
) -> Result<T, GenerationError> {
    let output = generator.generate(prompt).await?;
    let json = extract_json_object(&output).ok_or(GenerationError::NoJson)?;
    Ok(serde_json::from_str(&json)?)
}

/// Runs an external command per prompt.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl ContentGenerator for CommandGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let start = Instant::now();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        debug!(command = %self.command_line(), prompt_chars = prompt.len(), "spawning generator");
        let mut child = cmd.spawn().map_err(|source| GenerationError::SpawnFailed {
            command: self.command_line(),
            source,
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(prompt.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(GenerationError::NonZeroExit {
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        info!(
            output_chars = stdout.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "generator finished"
        );
        Ok(stdout)
    }
}
