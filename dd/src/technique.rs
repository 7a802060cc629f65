//! Communication technique vocabulary and state mapping
//!
//! The technique set is closed: the planner may only emit members of this
//! enum, and the generator only knows how to apply members of this enum.
//! `Unknown` is never chosen by deliberate policy but is always a legal
//! fallback, so every boundary that receives a technique string coerces
//! unrecognized values to it instead of erroring.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A named communication strategy the generator is instructed to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Technique {
    /// Ask a short, gentle question exploring a specific part of the message
    Probing,
    /// Acknowledge the user's feelings as understandable
    Validation,
    /// Mirror the primary emotion detected in the message
    Reflection,
    /// Give a brief, neutral summary of the key points
    Summarizing,
    /// Confirm understanding of what the user said
    Clarifying,
    /// Answer a direct question briefly and factually
    Information,
    /// Respond warmly to a greeting and invite sharing
    SocialGreeting,
    /// Fallback when no deliberate choice was made
    #[serde(other)]
    Unknown,
}

impl Technique {
    /// All members the planner may deliberately choose (excludes `Unknown`)
    pub fn all() -> [Technique; 7] {
        [
            Technique::Probing,
            Technique::Validation,
            Technique::Reflection,
            Technique::Summarizing,
            Technique::Clarifying,
            Technique::Information,
            Technique::SocialGreeting,
        ]
    }

    /// Stable wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Technique::Probing => "probing",
            Technique::Validation => "validation",
            Technique::Reflection => "reflection",
            Technique::Summarizing => "summarizing",
            Technique::Clarifying => "clarifying",
            Technique::Information => "information",
            Technique::SocialGreeting => "social_greeting",
            Technique::Unknown => "unknown",
        }
    }

    /// Parse a technique name, coercing anything unrecognized to `Unknown`
    ///
    /// This is the membership validation every component applies before
    /// acting on a technique value.
    pub fn parse(s: &str) -> Technique {
        debug!(%s, "Technique::parse: called");
        match s {
            "probing" => Technique::Probing,
            "validation" => Technique::Validation,
            "reflection" => Technique::Reflection,
            "summarizing" => Technique::Summarizing,
            "clarifying" => Technique::Clarifying,
            "information" => Technique::Information,
            "social_greeting" => Technique::SocialGreeting,
            "unknown" => Technique::Unknown,
            other => {
                debug!(%other, "Technique::parse: unrecognized, coercing to Unknown");
                Technique::Unknown
            }
        }
    }
}

impl std::fmt::Display for Technique {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Conversational state of the user's latest message
///
/// The planner classifies the latest message into one of these and applies
/// the deterministic mapping below. Classification itself is delegated to the
/// model; the mapping shapes the rules embedded in the planner prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    /// The user opens up about something new or personal
    OpeningDisclosure,
    /// A short, low-content reply; the conversation has stalled
    StalledReply,
    /// The user asks a direct question
    DirectQuestion,
    /// A greeting or small talk opener
    Greeting,
    /// Anything else
    Other,
}

impl ConversationState {
    /// All states, in the order they appear in the planner prompt
    pub fn all() -> [ConversationState; 5] {
        [
            ConversationState::OpeningDisclosure,
            ConversationState::StalledReply,
            ConversationState::DirectQuestion,
            ConversationState::Greeting,
            ConversationState::Other,
        ]
    }

    /// Human-readable description used in the planner prompt rules
    pub fn description(&self) -> &'static str {
        match self {
            ConversationState::OpeningDisclosure => "the user opens up about something new or personal",
            ConversationState::StalledReply => "a short or low-content reply, the conversation has stalled",
            ConversationState::DirectQuestion => "the user asks a direct question",
            ConversationState::Greeting => "a greeting or small-talk opener",
            ConversationState::Other => "anything else",
        }
    }
}

/// Deterministic state-to-technique mapping with anti-repetition
///
/// Each state has a primary technique and a distinct alternate. When the
/// primary would repeat the immediately preceding ai turn's technique, the
/// alternate is chosen instead, so two consecutive replies never carry the
/// same technique while the state is unchanged.
pub fn technique_for_state(state: ConversationState, previous: Option<Technique>) -> Technique {
    debug!(?state, ?previous, "technique_for_state: called");
    let (primary, alternate) = match state {
        ConversationState::OpeningDisclosure => (Technique::Reflection, Technique::Probing),
        ConversationState::StalledReply => (Technique::Validation, Technique::Probing),
        ConversationState::DirectQuestion => (Technique::Information, Technique::Clarifying),
        ConversationState::Greeting => (Technique::SocialGreeting, Technique::Probing),
        ConversationState::Other => (Technique::Clarifying, Technique::Summarizing),
    };

    if previous == Some(primary) {
        debug!(?primary, ?alternate, "technique_for_state: primary repeats previous, using alternate");
        alternate
    } else {
        primary
    }
}
