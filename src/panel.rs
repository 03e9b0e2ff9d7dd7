use crate::api::ReplyOutcome;
use crate::constants::SERVER_UNREACHABLE;
use crate::errors::ChatResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// The status line under a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelStatus {
    pub kind: StatusKind,
    pub message: String,
}

impl PanelStatus {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }
}

/// Which reply fields may explain a rejected request, in order of preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureText {
    DetailOnly,
    DetailThenStatus,
}

/// Turns the result of a form request into the line shown to the user.
pub fn status_from_outcome(
    result: &ChatResult<ReplyOutcome>,
    success_fallback: &str,
    failure_fallback: &str,
    failure_text: FailureText,
) -> PanelStatus {
    match result {
        Ok(outcome) if outcome.success => PanelStatus::success(
            outcome
                .reply
                .status_text()
                .unwrap_or_else(|| success_fallback.to_string()),
        ),
        Ok(outcome) => {
            let reply = &outcome.reply;
            let text = match failure_text {
                FailureText::DetailOnly => reply.detail_text(),
                FailureText::DetailThenStatus => reply.detail_text().or_else(|| reply.status_text()),
            };
            PanelStatus::error(text.unwrap_or_else(|| failure_fallback.to_string()))
        }
        Err(e) => {
            log::error!("Request failed: {}", e);
            PanelStatus::error(SERVER_UNREACHABLE)
        }
    }
}
