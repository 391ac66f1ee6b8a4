//! Authentication Models
//! Mission: Define user, role, and token claim data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role name granting access to the administrator probe.
pub const ADMINISTRATOR_ROLE: &str = "Administrator";

/// Identity account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub roles: Vec<String>,
    pub created_at: String,
}

/// JWT Claims payload
///
/// `role` preserves assignment order and is omitted from the payload entirely
/// when the identity holds no roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (username)
    pub email: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub role: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64, // expiration timestamp
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.role.iter().any(|r| r == role)
    }
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response: the authenticated identity plus its token
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

/// User response (sanitized)
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "testuser".to_string(),
            email: "testuser@example.com".to_string(),
            password_hash: "hash".to_string(),
            roles: vec!["User".to_string()],
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = sample_user();
        let json = serde_json::to_value(&user).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "testuser");
    }

    #[test]
    fn test_claims_role_array_preserves_order() {
        let claims = Claims {
            sub: "carol".to_string(),
            email: "carol@example.com".to_string(),
            role: vec!["User".to_string(), "Manager".to_string()],
            iss: "iss.example.com".to_string(),
            aud: "aud.example.com".to_string(),
            iat: 1_700_000_000,
            exp: 1_700_001_200,
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["role"][0], "User");
        assert_eq!(json["role"][1], "Manager");
    }

    #[test]
    fn test_claims_empty_roles_omitted() {
        let claims = Claims {
            sub: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Vec::new(),
            iss: String::new(),
            aud: String::new(),
            iat: 0,
            exp: 0,
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("role").is_none());

        // And a payload without the key deserializes back to an empty set.
        let round: Claims = serde_json::from_value(json).unwrap();
        assert!(round.role.is_empty());
    }

    #[test]
    fn test_has_role() {
        let mut claims = Claims {
            sub: "admin".to_string(),
            email: "admin@example.com".to_string(),
            role: vec![ADMINISTRATOR_ROLE.to_string()],
            iss: String::new(),
            aud: String::new(),
            iat: 0,
            exp: 0,
        };

        assert!(claims.has_role(ADMINISTRATOR_ROLE));
        assert!(!claims.has_role("User"));

        claims.role.clear();
        assert!(!claims.has_role(ADMINISTRATOR_ROLE));
    }

    #[test]
    fn test_user_response_excludes_hash_by_construction() {
        let user = sample_user();
        let response = UserResponse::from_user(&user);

        assert_eq!(response.username, user.username);
        assert_eq!(response.roles, user.roles);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
