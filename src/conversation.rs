//! Per-session chat transcript.

use serde::{Deserialize, Serialize};

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "speaker", content = "text")]
pub enum ConversationTurn {
    Human(String),
    #[serde(rename = "AI")]
    Ai(String),
}

impl ConversationTurn {
    /// Display name of the speaker: `"Human"` or `"AI"`.
    pub fn speaker(&self) -> &'static str {
        match self {
            ConversationTurn::Human(_) => "Human",
            ConversationTurn::Ai(_) => "AI",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ConversationTurn::Human(t) | ConversationTurn::Ai(t) => t,
        }
    }
}

/// Ordered, append-only list of turns. Lives as long as the session that
/// owns it; nothing is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// Every turn, oldest first.
    pub fn all(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
