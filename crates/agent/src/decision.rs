//! Decision protocol — the single JSON step the backend emits each turn.
//!
//! The backend's text is untrusted. [`parse_decision`] never fails: anything
//! that is not exactly one well-formed step becomes a sentinel
//! [`DecisionStep`] with `decision: None` and the problem described in
//! `thought`.

use anvil_core::text::prefix;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

const RAW_EXCERPT_CHARS: usize = 500;

/// One decoded step: the backend's reasoning plus what it wants to do next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionStep {
    pub thought: String,
    /// `None` is the sentinel for unusable output.
    pub decision: Option<Decision>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Decision {
    Action(ActionCall),
    Final { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionCall {
    pub tool: String,
    pub args: Value,
    pub reason: String,
}

impl DecisionStep {
    fn sentinel(thought: impl Into<String>) -> Self {
        Self {
            thought: thought.into(),
            decision: None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.decision.is_none()
    }

    pub fn action(&self) -> Option<&ActionCall> {
        match &self.decision {
            Some(Decision::Action(call)) => Some(call),
            _ => None,
        }
    }

    pub fn final_message(&self) -> Option<&str> {
        match &self.decision {
            Some(Decision::Final { message }) => Some(message),
            _ => None,
        }
    }
}

/// Strip a surrounding code fence and keep the span from the first `{` to
/// the last `}`.
fn candidate_json(raw: &str) -> &str {
    let mut text = raw.trim();
    if text.len() >= 6 && text.starts_with("```") && text.ends_with("```") {
        text = text.trim_matches('`').trim();
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}

/// A sentinel whose thought carries `problem` and a bounded excerpt of the
/// text that was parsed.
fn rejected(problem: &str, text: &str) -> DecisionStep {
    DecisionStep::sentinel(format!(
        "{problem}\nRaw: {}",
        prefix(text, RAW_EXCERPT_CHARS)
    ))
}

fn missing_keys(text: &str) -> DecisionStep {
    rejected("Parse error: missing required keys.", text)
}

fn decode_action(value: &Value) -> Option<ActionCall> {
    let action = value.as_object()?;
    let tool = action.get("tool")?.as_str()?.to_string();
    let args = match action.get("args") {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(args) => args.clone(),
    };
    let reason = action
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Some(ActionCall { tool, args, reason })
}

fn decode_final(value: &Value) -> Option<String> {
    value.get("message")?.as_str().map(str::to_string)
}

/// Decode the backend's reply into a [`DecisionStep`].
pub fn parse_decision(raw: &str) -> DecisionStep {
    let text = candidate_json(raw);

    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Backend reply is not valid JSON");
            return rejected(&format!("JSON parse error: {e}"), text);
        }
    };

    let Some(object) = value.as_object() else {
        warn!("Backend reply is not a JSON object");
        return missing_keys(text);
    };
    let Some(thought) = object.get("thought").and_then(Value::as_str) else {
        warn!("Backend reply has no thought");
        return missing_keys(text);
    };
    let thought = thought.to_string();

    let decision = match (object.get("action"), object.get("final")) {
        (Some(_), Some(_)) => {
            warn!("Backend reply carries both action and final");
            return rejected(
                "Parse error: reply must contain exactly one of 'action' or 'final'.",
                text,
            );
        }
        (Some(action), None) => decode_action(action).map(Decision::Action),
        (None, Some(fin)) => decode_final(fin).map(|message| Decision::Final { message }),
        (None, None) => None,
    };

    match decision {
        Some(decision) => DecisionStep {
            thought,
            decision: Some(decision),
        },
        None => {
            warn!("Backend reply is missing required keys");
            missing_keys(text)
        }
    }
}
