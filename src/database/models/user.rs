use serde::{Deserialize, Serialize};
use std::fmt;

use super::{fields, optional_str, required_str, FromHit, MappingError};
use crate::database::store::Hit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Consultant,
    #[default]
    Other,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Consultant => "consultant",
            UserRole::Other => "other",
        }
    }

    /// Any value other than `consultant` is a plain user
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("consultant") {
            UserRole::Consultant
        } else {
            UserRole::Other
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
}

impl FromHit for User {
    const KIND: &'static str = "user";

    fn from_hit(hit: &Hit) -> Result<Self, MappingError> {
        Ok(Self {
            id: hit.id.clone(),
            email: required_str(hit, fields::EMAIL)?,
            name: required_str(hit, fields::NAME)?,
            role: optional_str(hit, fields::ROLE)?
                .map(|r| UserRole::parse(&r))
                .unwrap_or_default(),
            password_hash: optional_str(hit, fields::PASSWORD_HASH)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_user_with_defaults() {
        let hit = Hit::new(
            "u1",
            json!({ "Email": "jane@rastarockets.io", "Name": "Jane" }).as_object().cloned().unwrap(),
        );
        let user = User::from_hit(&hit).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.role, UserRole::Other);
        assert_eq!(user.password_hash, None);
    }

    #[test]
    fn password_hash_never_serialized() {
        let user = User {
            id: "u1".into(),
            email: "jane@rastarockets.io".into(),
            name: "Jane".into(),
            role: UserRole::Consultant,
            password_hash: Some("$argon2id$...".into()),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["role"], "consultant");
        assert!(value.get("password_hash").is_none());
    }
}
