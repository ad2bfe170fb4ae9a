use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One-to-one companion row of an auth user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub global_role: Option<String>,
    pub onboarding_completed: bool,
    pub viberate_artist_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(id: Uuid, email: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            global_role: None,
            onboarding_completed: false,
            viberate_artist_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.global_role.as_deref() == Some(role)
    }
}
