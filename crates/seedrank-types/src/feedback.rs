//! User feedback records returned by the feedback collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One feedback event a user left on an item (e.g. "like", "purchase").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub user_id: String,
    pub item_id: String,
    pub feedback_type: String,
    pub timestamp: DateTime<Utc>,
}
