use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Personnel account; owns zero or more devices
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub rank: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub password: String,
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub rank: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: Option<String>,
}

impl UserProfile {
    /// `rank firstName lastName`, the way reports print a person
    pub fn display_name(&self) -> String {
        match self.rank.as_deref().filter(|r| !r.is_empty()) {
            Some(rank) => format!("{} {} {}", rank, self.first_name, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            rank: user.rank,
            first_name: user.first_name,
            last_name: user.last_name,
            contact_number: user.contact_number,
        }
    }
}
