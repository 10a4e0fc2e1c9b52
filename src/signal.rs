//! Signal classification: maps user-interaction events to mood/energy deltas.
//!
//! A [`Signal`] is an ephemeral `(kind, payload)` pair. [`classify`] turns it
//! into an [`Adjustment`] without touching any state. Unknown kinds, unknown
//! game ids and missing payload fields all classify to [`Adjustment::ZERO`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Signal kinds
// ---------------------------------------------------------------------------

/// Interaction event types the classifier understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignalKind {
    /// A task was checked off.
    TaskComplete,
    /// A task was pushed to a later date.
    TaskReschedule,
    /// A task was deleted.
    TaskDelete,
    /// The user sent a message to the companion chat.
    ChatMessage,
    /// The user finished a relaxation mini-game.
    GamePlayed,
    /// Session length report. Carries no weight yet.
    AppSession,
    /// Any kind this build doesn't know about. Always a no-op.
    Unrecognized(String),
}

impl SignalKind {
    /// All recognized kinds in canonical order.
    pub const KNOWN: [SignalKind; 6] = [
        SignalKind::TaskComplete,
        SignalKind::TaskReschedule,
        SignalKind::TaskDelete,
        SignalKind::ChatMessage,
        SignalKind::GamePlayed,
        SignalKind::AppSession,
    ];

    /// Wire name of this kind (`TASK_COMPLETE`, ...).
    pub fn name(&self) -> &str {
        match self {
            Self::TaskComplete => "TASK_COMPLETE",
            Self::TaskReschedule => "TASK_RESCHEDULE",
            Self::TaskDelete => "TASK_DELETE",
            Self::ChatMessage => "CHAT_MESSAGE",
            Self::GamePlayed => "GAME_PLAYED",
            Self::AppSession => "APP_SESSIONS",
            Self::Unrecognized(name) => name,
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignalKind {
    type Err = std::convert::Infallible;

    /// Parse an exact wire name. Never fails: anything else, including
    /// other spellings of a known name, becomes [`SignalKind::Unrecognized`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = Self::KNOWN
            .into_iter()
            .find(|kind| kind.name() == s)
            .unwrap_or_else(|| Self::Unrecognized(s.to_string()));
        Ok(kind)
    }
}

impl From<String> for SignalKind {
    fn from(name: String) -> Self {
        match name.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<SignalKind> for String {
    fn from(kind: SignalKind) -> Self {
        kind.name().to_string()
    }
}

// ---------------------------------------------------------------------------
// Payload and signal
// ---------------------------------------------------------------------------

/// Kind-specific data attached to a signal. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalPayload {
    /// Message text for `CHAT_MESSAGE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Game identifier for `GAME_PLAYED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
}

impl SignalPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn game(game_id: impl Into<String>) -> Self {
        Self {
            game_id: Some(game_id.into()),
            ..Default::default()
        }
    }
}

/// One user-interaction event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    #[serde(default)]
    pub payload: SignalPayload,
}

impl Signal {
    /// A signal with an empty payload.
    pub fn new(kind: SignalKind) -> Self {
        Self {
            kind,
            payload: SignalPayload::default(),
        }
    }

    pub fn with_payload(kind: SignalKind, payload: SignalPayload) -> Self {
        Self { kind, payload }
    }

    /// Shorthand for a `CHAT_MESSAGE` signal.
    pub fn chat(text: impl Into<String>) -> Self {
        Self::with_payload(SignalKind::ChatMessage, SignalPayload::text(text))
    }

    /// Shorthand for a `GAME_PLAYED` signal.
    pub fn game(game_id: impl Into<String>) -> Self {
        Self::with_payload(SignalKind::GamePlayed, SignalPayload::game(game_id))
    }
}

impl From<SignalKind> for Signal {
    fn from(kind: SignalKind) -> Self {
        Self::new(kind)
    }
}

// ---------------------------------------------------------------------------
// Adjustment
// ---------------------------------------------------------------------------

/// Signed, pre-clamp change to apply to the inference state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Adjustment {
    pub mood: f64,
    pub energy: f64,
}

impl Adjustment {
    pub const ZERO: Adjustment = Adjustment::new(0.0, 0.0);

    pub const fn new(mood: f64, energy: f64) -> Self {
        Self { mood, energy }
    }

    pub fn is_zero(&self) -> bool {
        self.mood == 0.0 && self.energy == 0.0
    }
}

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

/// Classification bucket of a mini-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    /// Slow, restorative games (breathing, mandala).
    Calming,
    /// Playful, stimulating games (bubble pop, sliding tiles).
    Active,
    /// Any other game id. Carries no weight.
    Other,
}

impl GameKind {
    /// Bucket a game id. Ids are matched exactly; both the hyphenated and the
    /// compact spellings of the active games are accepted.
    pub fn of(game_id: &str) -> Self {
        match game_id {
            "breathing" | "mandala" => Self::Calming,
            "bubble-pop" | "bubblepop" | "sliding-tile" | "sliding" => Self::Active,
            _ => Self::Other,
        }
    }

    pub fn adjustment(self) -> Adjustment {
        match self {
            Self::Calming => Adjustment::new(1.5, 0.5),
            Self::Active => Adjustment::new(1.0, 0.2),
            Self::Other => Adjustment::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

/// Words that mark a chat message as positive.
pub const POSITIVE_WORDS: [&str; 10] = [
    "happy",
    "great",
    "good",
    "love",
    "excited",
    "thanks",
    "wonderful",
    "better",
    "calm",
    "relaxed",
];

/// Words that mark a chat message as negative.
pub const NEGATIVE_WORDS: [&str; 10] = [
    "sad",
    "bad",
    "tired",
    "stress",
    "angry",
    "anxious",
    "exhausted",
    "pain",
    "hurt",
    "hard",
];

/// Coarse sentiment of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn adjustment(self) -> Adjustment {
        match self {
            Self::Positive => Adjustment::new(1.0, 0.0),
            Self::Negative => Adjustment::new(-1.5, -0.5),
            Self::Neutral => Adjustment::ZERO,
        }
    }
}

/// Keyword sentiment over the lower-cased text.
///
/// Matching is substring containment, so "sadly" counts as "sad" and
/// "badge" counts as "bad". A message holding words from both lists, or from
/// neither, is [`Sentiment::Neutral`].
pub fn analyze_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let has_positive = POSITIVE_WORDS.iter().any(|w| lower.contains(w));
    let has_negative = NEGATIVE_WORDS.iter().any(|w| lower.contains(w));

    match (has_positive, has_negative) {
        (true, false) => Sentiment::Positive,
        (false, true) => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// Convert one signal into a mood/energy adjustment.
pub fn classify(signal: &Signal) -> Adjustment {
    match &signal.kind {
        SignalKind::TaskComplete => Adjustment::new(0.5, 0.5),
        SignalKind::TaskReschedule => Adjustment::new(-0.2, -0.5),
        SignalKind::TaskDelete => Adjustment::new(-0.5, 0.0),
        SignalKind::ChatMessage => {
            analyze_sentiment(signal.payload.text.as_deref().unwrap_or_default()).adjustment()
        }
        SignalKind::GamePlayed => signal
            .payload
            .game_id
            .as_deref()
            .map(GameKind::of)
            .unwrap_or(GameKind::Other)
            .adjustment(),
        SignalKind::AppSession | SignalKind::Unrecognized(_) => Adjustment::ZERO,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
