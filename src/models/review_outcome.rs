use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One logged recall attempt. Append-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub id: String,
    pub card_id: String,
    pub known: bool,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewOutcome {
    pub fn new(card_id: impl Into<String>, known: bool, reviewed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            card_id: card_id.into(),
            known,
            reviewed_at,
        }
    }
}
