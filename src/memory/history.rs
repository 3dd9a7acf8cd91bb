//! Conversation turn model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Chat user input.
    User,
    /// Mika's reply. Older history files spell this `"model"`.
    #[serde(alias = "model")]
    Assistant,
}

/// One entry of a channel history.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Author of the turn.
    pub role: Role,
    /// Text of the turn.
    pub content: String,
}

impl ConversationTurn {
    /// A user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Point-in-time copy of every channel's history, keyed by channel id.
pub type HistorySnapshot = BTreeMap<String, Vec<ConversationTurn>>;

/// Drop the oldest entries so at most `max_entries` remain.
pub fn trim_to(turns: &mut Vec<ConversationTurn>, max_entries: usize) {
    if turns.len() > max_entries {
        let excess = turns.len() - max_entries;
        turns.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        let turn = ConversationTurn::assistant("hi");
        let json = serde_json::to_string(&turn).expect("serialize");
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_legacy_model_role_accepted() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"role":"model","content":"hey"}"#).expect("deserialize");
        assert_eq!(turn, ConversationTurn::assistant("hey"));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result: Result<ConversationTurn, _> =
            serde_json::from_str(r#"{"role":"system","content":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_trim_keeps_newest() {
        let mut turns: Vec<_> = (0..5).map(|i| ConversationTurn::user(i.to_string())).collect();
        trim_to(&mut turns, 3);
        let contents: Vec<_> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["2", "3", "4"]);

        trim_to(&mut turns, 10);
        assert_eq!(turns.len(), 3);
    }
}
