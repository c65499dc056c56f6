use serde::{Deserialize, Serialize};

/// Singleton, admin-editable booking limits.
///
/// `None` means unbounded for both caps. Read fresh at the start of
/// every create-reservation call and passed by value into the policy
/// evaluator, so one call observes one consistent snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSettings {
    pub max_advance_days: Option<u32>,
    pub max_concurrent_reservations: Option<u32>,
    pub internal_message: String,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            max_advance_days: Some(30),
            max_concurrent_reservations: Some(3),
            internal_message: "Confirm availability before approving a special reservation."
                .to_string(),
        }
    }
}

/// Partial settings update; omitted fields are unchanged, a cap of 0
/// clears the limit (stored as unbounded).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSettingsRequest {
    pub max_advance_days: Option<u32>,
    pub max_concurrent_reservations: Option<u32>,
    pub internal_message: Option<String>,
}

impl SystemSettings {
    /// Apply a partial update in place
    pub fn apply(&mut self, update: UpdateSettingsRequest) {
        if let Some(days) = update.max_advance_days {
            self.max_advance_days = if days == 0 { None } else { Some(days) };
        }
        if let Some(cap) = update.max_concurrent_reservations {
            self.max_concurrent_reservations = if cap == 0 { None } else { Some(cap) };
        }
        if let Some(message) = update.internal_message {
            self.internal_message = message;
        }
    }
}
