//! Loop events, emitted as the ReAct loop progresses so a front end can
//! render the scratchpad live.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The backend's reasoning for this step.
    Thought { step: usize, content: String },

    /// A capability is about to be invoked.
    Action {
        step: usize,
        tool: String,
        args: serde_json::Value,
        reason: String,
    },

    /// The capability's result, fed back as the next observation.
    Observation { step: usize, ok: bool, output: String },

    /// The reply could not be decoded; the step was wasted.
    Degraded { step: usize, detail: String },

    /// The loop terminated with an answer.
    Final { message: String },

    /// The step budget ran out before a final answer.
    StepLimit { steps: usize },
}

impl AgentEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Thought { .. } => "thought",
            Self::Action { .. } => "action",
            Self::Observation { .. } => "observation",
            Self::Degraded { .. } => "degraded",
            Self::Final { .. } => "final",
            Self::StepLimit { .. } => "step_limit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = AgentEvent::Observation {
            step: 1,
            ok: true,
            output: "done".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"observation""#));
        assert_eq!(event.event_type(), "observation");

        let back: AgentEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
