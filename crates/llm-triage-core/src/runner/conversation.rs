//! Conversation runner
//!
//! Drives the request/execute/respond cycle:
//!
//! ```text
//! AwaitingModel ──final──▶ Completed
//!      │   ▲
//!  calls   │ one result per call, in request order
//!      ▼   │
//! ExecutingCalls
//! ```
//!
//! Each `step()` performs exactly one transition. A model failure on the
//! first turn is fatal; later it halts the run without an error because
//! side effects have already happened.

use futures::future::join_all;
use std::sync::Arc;

use super::error::{RunError, RunResult};
use super::state::{HaltReason, RunOutcome, RunState, RunStatus, RunnerOptions, Transcript};
use crate::config::RunConfig;
use crate::logging::Logger;
use crate::providers::{ChatOptions, ChatResponse, Provider, ProviderError, ProviderModelConfig};
use crate::tools::{OperationRegistry, ToolError};
use crate::types::{ChatMessage, SamplingParams, ToolCall, ToolChoice, ToolResult};

/// Everything one conversation needs besides its collaborators
#[derive(Debug, Clone)]
pub struct RunSetup {
    pub model: ProviderModelConfig,
    pub sampling: SamplingParams,
    pub tool_choice: ToolChoice,
    /// Operations offered to the model, in this order
    pub enabled_operations: Vec<String>,
    pub system_prompt: String,
    pub user_input: String,
    pub options: RunnerOptions,
}

impl RunSetup {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            model: config.model_config(),
            sampling: config.sampling,
            tool_choice: config.tool_choice,
            enabled_operations: config.enabled_operations.clone(),
            system_prompt: config.system_prompt.clone(),
            user_input: config.user_input.clone(),
            options: RunnerOptions {
                max_turns: config.max_turns,
                call_timeout: config.request_timeout,
            },
        }
    }
}

/// Owns the transcript and drives the model to a final message
pub struct ConversationRunner {
    provider: Arc<dyn Provider>,
    registry: Arc<OperationRegistry>,
    model: ProviderModelConfig,
    chat_options: ChatOptions,
    enabled: Vec<String>,
    options: RunnerOptions,
    logger: Arc<dyn Logger>,
    state: RunState,
    transcript: Transcript,
    turns: usize,
    executed: usize,
    failed: usize,
}

impl ConversationRunner {
    /// Create a runner.
    ///
    /// Fails with `UnknownOperation` if an enabled operation is not in the
    /// registry.
    pub fn new(
        provider: Arc<dyn Provider>,
        registry: Arc<OperationRegistry>,
        setup: RunSetup,
        logger: Arc<dyn Logger>,
    ) -> RunResult<Self> {
        let descriptors = registry.descriptors_for(&setup.enabled_operations)?;
        let chat_options = ChatOptions::new()
            .with_sampling(setup.sampling)
            .with_tools(descriptors)
            .with_tool_choice(setup.tool_choice);

        Ok(Self {
            provider,
            registry,
            model: setup.model,
            chat_options,
            enabled: setup.enabled_operations,
            options: setup.options,
            logger,
            state: RunState::AwaitingModel,
            transcript: Transcript::start(&setup.system_prompt, &setup.user_input),
            turns: 0,
            executed: 0,
            failed: 0,
        })
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Model calls made so far
    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Perform one transition. Terminal states are left unchanged.
    pub async fn step(&mut self) -> RunResult<&RunState> {
        let state = std::mem::replace(&mut self.state, RunState::AwaitingModel);
        self.state = match state {
            RunState::AwaitingModel => self.await_model().await?,
            RunState::ExecutingCalls(calls) => self.execute_calls(calls).await,
            terminal => terminal,
        };
        Ok(&self.state)
    }

    /// Step until the run completes or halts
    pub async fn run(mut self) -> RunResult<RunOutcome> {
        while !self.step().await?.is_terminal() {}
        Ok(self.into_outcome())
    }

    fn into_outcome(self) -> RunOutcome {
        let status = match self.state {
            RunState::Completed(text) => RunStatus::Completed(text),
            RunState::Halted(reason) => RunStatus::Halted(reason),
            // run() only returns on a terminal state
            _ => RunStatus::Halted(HaltReason::ModelUnavailable("run interrupted".to_string())),
        };
        RunOutcome {
            status,
            transcript: self.transcript,
            turns: self.turns,
            executed: self.executed,
            failed: self.failed,
        }
    }

    async fn await_model(&mut self) -> RunResult<RunState> {
        if self.turns >= self.options.max_turns {
            self.logger.warn(&format!(
                "[ConversationRunner] No final message after {} turns, stopping",
                self.turns
            ));
            return Ok(RunState::Halted(HaltReason::TurnLimitReached { turns: self.turns }));
        }

        self.turns += 1;
        self.logger.debug(&format!(
            "[ConversationRunner] Turn {}: sending {} messages",
            self.turns,
            self.transcript.len()
        ));

        let response = match self.request_completion().await {
            Ok(response) => response,
            Err(e) if self.turns == 1 => {
                self.logger
                    .error(&format!("[ConversationRunner] Model request failed: {}", e));
                self.state = RunState::Halted(HaltReason::ModelUnavailable(e.to_string()));
                return Err(RunError::FirstTurnFailed(e));
            }
            Err(e) => {
                self.logger.warn(&format!(
                    "[ConversationRunner] Model request failed on turn {}: {}",
                    self.turns, e
                ));
                return Ok(RunState::Halted(HaltReason::ModelUnavailable(e.to_string())));
            }
        };

        if response.is_final() {
            let text = response.content.unwrap_or_default();
            self.transcript.push(ChatMessage::assistant(text.clone()));
            return Ok(RunState::Completed(text));
        }

        self.logger.info(&format!(
            "[ConversationRunner] Turn {}: model requested {} call(s)",
            self.turns,
            response.tool_calls.len()
        ));
        self.transcript.push(ChatMessage::assistant_with_calls(
            response.content,
            &response.tool_calls,
        ));
        Ok(RunState::ExecutingCalls(response.tool_calls))
    }

    async fn request_completion(&self) -> Result<ChatResponse, ProviderError> {
        let request = self.provider.chat(
            self.transcript.messages(),
            &self.model,
            &self.chat_options,
        );
        match tokio::time::timeout(self.options.call_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::timeout(
                self.provider.name(),
                self.options.call_timeout.as_secs(),
            )),
        }
    }

    async fn execute_calls(&mut self, calls: Vec<ToolCall>) -> RunState {
        // Calls in one turn are independent; results are collected in request order.
        let outcomes = join_all(calls.iter().map(|call| self.execute_one(call))).await;

        for (call, outcome) in calls.iter().zip(outcomes) {
            let result = match outcome {
                Ok(content) => {
                    self.executed += 1;
                    ToolResult::success(&call.id, content)
                }
                Err(e) => {
                    self.failed += 1;
                    ToolResult::error(&call.id, e.to_string())
                }
            };
            self.transcript.push(ChatMessage::tool_result(&result));
        }

        RunState::AwaitingModel
    }

    async fn execute_one(&self, call: &ToolCall) -> Result<String, ToolError> {
        if !self.enabled.iter().any(|name| name == &call.name) {
            self.logger.warn(&format!(
                "[ConversationRunner] Rejected call to {}: not enabled",
                call.name
            ));
            return Err(ToolError::UnknownOperation(call.name.clone()));
        }

        match tokio::time::timeout(self.options.call_timeout, self.registry.dispatch(call)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout {
                operation: call.name.clone(),
                seconds: self.options.call_timeout.as_secs(),
            }),
        }
    }
}
