// frame.rs - Theming and messaging for the embedded chat frame
//
// Styling a third-party frame only works when it happens to be same-origin,
// so every attempt is expected to fail. Attempts are bounded with a fixed
// delay and end in a sticky GaveUp.

use serde::Serialize;
use thiserror::Error;

use crate::config::FrameConfig;

pub const THEME_CSS: &str = r#"
body {
  background-color: #2a0066 !important;
  font-family: 'Cascadia Code', 'Consolas', monospace !important;
}
p, span, div, button, input, textarea, a {
  color: #ffd700 !important;
  font-family: 'Cascadia Code', 'Consolas', monospace !important;
}
input, textarea {
  background-color: rgba(255, 255, 255, 0.1) !important;
  border: 1px solid #ffd700 !important;
}
button {
  background-color: rgba(255, 215, 0, 0.2) !important;
  border: 1px solid #ffd700 !important;
}
"#;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StyleError {
    #[error("frame document is not accessible: {0}")]
    CrossOrigin(String),
    #[error("frame document has no head")]
    NoHead,
    #[error("dom error: {0}")]
    Dom(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryStep {
    Done,
    RetryAfter(u32),
    GaveUp,
}

#[derive(Debug, Clone)]
pub struct StyleRetry {
    max_attempts: u32,
    delay_ms: u32,
    attempts: u32,
    finished: Option<RetryStep>,
}

impl StyleRetry {
    pub fn new(config: &FrameConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay_ms: config.delay_ms,
            attempts: 0,
            finished: None,
        }
    }

    pub fn attempts(&self) -> u32 { self.attempts }

    pub fn is_finished(&self) -> bool { self.finished.is_some() }

    /// Feed the result of one styling attempt and learn what to do next.
    pub fn record(&mut self, result: Result<(), StyleError>) -> RetryStep {
        if let Some(step) = self.finished {
            return step;
        }
        self.attempts += 1;
        match result {
            Ok(()) => {
                log::info!("chat frame themed after {} attempt(s)", self.attempts);
                self.finish(RetryStep::Done)
            }
            Err(err) if self.attempts >= self.max_attempts => {
                log::warn!("giving up on theming chat frame after {} attempts: {err}", self.attempts);
                self.finish(RetryStep::GaveUp)
            }
            Err(err) => {
                log::debug!("chat frame theming attempt {} failed: {err}", self.attempts);
                RetryStep::RetryAfter(self.delay_ms)
            }
        }
    }

    fn finish(&mut self, step: RetryStep) -> RetryStep {
        self.finished = Some(step);
        step
    }
}

/// Requests posted into the frame; the frame may ignore them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum FrameCommand {
    NewChat,
    LoadChat {
        #[serde(rename = "chatId")]
        id: String,
    },
}
