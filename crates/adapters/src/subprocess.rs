// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The default `Engine` implementation: runs an external CLI as a
//! subprocess, feeding it the prompt on stdin and reading its final
//! output from stdout.

use crate::engine::{
    AgentConfig, ChainedPromptResult, Engine, EngineError, EngineMetadata, ExecCtx, ExecResult,
    LogLine, PromptInput,
};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::warn;

/// Spawns `program` with `args`, writing the resolved prompt to stdin and
/// streaming stdout lines through `ctx.log_sink` as they arrive.
pub struct SubprocessEngine {
    id: String,
    program: String,
    args: Vec<String>,
    default_model: Option<String>,
}

impl SubprocessEngine {
    pub fn new(id: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            id: id.into(),
            program: program.into(),
            args,
            default_model: None,
        }
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    async fn resolve_prompt(&self, input: &PromptInput) -> Result<String, EngineError> {
        match input {
            PromptInput::Prompt(text) => Ok(text.clone()),
            PromptInput::PromptPath(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
                EngineError::Failed {
                    engine_id: self.id.clone(),
                    reason: format!("failed to read prompt file {path}: {e}"),
                }
            }),
        }
    }

    async fn run(&self, ctx: ExecCtx, resume_session_id: Option<String>) -> Result<ExecResult, EngineError> {
        let prompt = self.resolve_prompt(&ctx.prompt).await?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&ctx.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(model) = ctx.model.as_ref().or(self.default_model.as_ref()) {
            cmd.env("CODEMACHINE_MODEL", model);
        }
        if let Some(session_id) = &resume_session_id {
            cmd.env("CODEMACHINE_RESUME_SESSION", session_id);
        }

        let mut child = cmd.spawn().map_err(|e| EngineError::Failed {
            engine_id: self.id.clone(),
            reason: format!("failed to spawn {}: {e}", self.program),
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(prompt.as_bytes()).await;
        }

        let mut lines = String::new();
        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout).lines();
            loop {
                tokio::select! {
                    biased;
                    line = reader.next_line() => {
                        match line {
                            Ok(Some(line)) => {
                                let _ = ctx
                                    .log_sink
                                    .send(LogLine {
                                        monitoring_id: ctx.monitoring_id,
                                        text: line.clone(),
                                    })
                                    .await;
                                lines.push_str(&line);
                                lines.push('\n');
                            }
                            _ => break,
                        }
                    }
                    _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                        if ctx.abort_signal.is_aborted() {
                            let _ = child.start_kill();
                            return Err(EngineError::Adapter(codemachine_core::AdapterError::Aborted));
                        }
                    }
                }
            }
        }

        let status = child.wait().await.map_err(|e| EngineError::Failed {
            engine_id: self.id.clone(),
            reason: format!("{} exited abnormally: {e}", self.program),
        })?;

        if !status.success() {
            warn!(engine = %self.id, code = ?status.code(), "subprocess exited non-zero");
            return Err(EngineError::Failed {
                engine_id: self.id.clone(),
                reason: format!("{} exited with {:?}", self.program, status.code()),
            });
        }

        Ok(ExecResult {
            output: lines.trim_end().to_string(),
            session_id: None,
            chained_prompts: Vec::<ChainedPromptResult>::new(),
            monitoring_id: ctx.monitoring_id,
        })
    }
}

#[async_trait]
impl Engine for SubprocessEngine {
    fn metadata(&self) -> EngineMetadata {
        EngineMetadata {
            id: self.id.clone(),
            default_model: self.default_model.clone(),
        }
    }

    fn supports_resume(&self) -> bool {
        true
    }

    async fn sync_config(&self, _configs: &[AgentConfig]) -> Result<(), EngineError> {
        Ok(())
    }

    async fn execute(&self, ctx: ExecCtx) -> Result<ExecResult, EngineError> {
        self.run(ctx, None).await
    }

    async fn resume(&self, ctx: ExecCtx) -> Result<ExecResult, EngineError> {
        let resume_session_id = ctx.resume_session_id.as_ref().map(|s| s.to_string());
        self.run(ctx, resume_session_id).await
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
