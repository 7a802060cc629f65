//! Row types for the conversation and journal tables

use serde::{Deserialize, Serialize};

/// Who authored a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    /// Stable string form used in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Ai => "ai",
        }
    }

    /// Parse from the database string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Sender::User),
            "ai" => Some(Sender::Ai),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted conversation turn
///
/// Immutable after insert except for the moderation `flagged` bit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Row id
    pub id: i64,
    /// Owning user id
    pub owner_id: String,
    /// Turn author
    pub sender: Sender,
    /// Message text
    pub content: String,
    /// Communication technique, set only on ai-authored turns
    pub technique: Option<String>,
    /// Optional affect label describing detected emotional tone
    pub affect: Option<String>,
    /// Moderation flag, toggled by an explicit flag operation
    pub flagged: bool,
    /// Creation timestamp (unix ms)
    pub created_at: i64,
}

/// Fields for inserting a new turn
#[derive(Debug, Clone)]
pub struct NewTurn {
    pub owner_id: String,
    pub sender: Sender,
    pub content: String,
    pub technique: Option<String>,
    pub affect: Option<String>,
}

impl NewTurn {
    /// A user-authored turn with optional affect label
    pub fn user(owner_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            sender: Sender::User,
            content: content.into(),
            technique: None,
            affect: None,
        }
    }

    /// An ai-authored turn tagged with the technique that produced it
    pub fn ai(owner_id: impl Into<String>, content: impl Into<String>, technique: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            sender: Sender::Ai,
            content: content.into(),
            technique: Some(technique.into()),
            affect: None,
        }
    }

    /// Attach an affect label
    pub fn with_affect(mut self, affect: impl Into<String>) -> Self {
        self.affect = Some(affect.into());
        self
    }
}

/// A persisted journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Row id
    pub id: i64,
    /// Owning user id
    pub owner_id: String,
    /// Entry title
    pub title: String,
    /// Entry body
    pub content: String,
    /// Optional mood tag
    pub mood: Option<String>,
    /// Creation timestamp (unix ms)
    pub created_at: i64,
}

/// Fields for inserting a new journal entry
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub owner_id: String,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
}

impl NewEntry {
    pub fn new(owner_id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            title: title.into(),
            content: content.into(),
            mood: None,
        }
    }

    /// Attach a mood tag
    pub fn with_mood(mut self, mood: impl Into<String>) -> Self {
        self.mood = Some(mood.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_round_trip() {
        assert_eq!(Sender::parse(Sender::User.as_str()), Some(Sender::User));
        assert_eq!(Sender::parse(Sender::Ai.as_str()), Some(Sender::Ai));
        assert_eq!(Sender::parse("bot"), None);
    }

    #[test]
    fn test_new_turn_user() {
        let turn = NewTurn::user("local", "hello");
        assert_eq!(turn.sender, Sender::User);
        assert!(turn.technique.is_none());
        assert!(turn.affect.is_none());
    }

    #[test]
    fn test_new_turn_ai_carries_technique() {
        let turn = NewTurn::ai("local", "tell me more", "probing");
        assert_eq!(turn.sender, Sender::Ai);
        assert_eq!(turn.technique.as_deref(), Some("probing"));
    }

    #[test]
    fn test_new_turn_with_affect() {
        let turn = NewTurn::user("local", "ugh").with_affect("frustrated");
        assert_eq!(turn.affect.as_deref(), Some("frustrated"));
    }
}
