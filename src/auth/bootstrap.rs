//! Role/User Bootstrap
//! Mission: One-shot, idempotent seeding of roles and the initial user

use crate::auth::user_store::CredentialStore;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// Seed file contents.
#[derive(Debug, Deserialize)]
pub struct SeedConfig {
    /// Application roles to create.
    pub roles: Vec<String>,
    pub user: SeedUser,
}

/// The initial user, with password and role assignments.
#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// What a seeding pass actually did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub roles_created: usize,
    pub roles_existing: usize,
    pub user_created: bool,
}

pub fn parse_seed_config(toml_text: &str) -> Result<SeedConfig> {
    toml::from_str(toml_text).context("Failed to parse seed file")
}

/// Apply the seed: create missing roles, then the user if absent, then its
/// role assignments. Idempotent by name-existence check; a second run changes
/// nothing.
pub fn apply_seed(store: &dyn CredentialStore, seed: &SeedConfig) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for role in &seed.roles {
        if store.role_exists(role)? {
            info!("Role '{}' already exists", role);
            report.roles_existing += 1;
        } else {
            store.create_role(role)?;
            info!("Role '{}' has been created", role);
            report.roles_created += 1;
        }
    }

    match store.find_user_by_username(&seed.user.username)? {
        Some(_) => {
            info!("User '{}' already exists", seed.user.username);
        }
        None => {
            let user =
                store.create_user(&seed.user.username, &seed.user.email, &seed.user.password)?;
            store.add_user_to_roles(&user.id, &seed.user.roles)?;
            info!(
                "User '{}' has been created with roles {:?}",
                user.username, seed.user.roles
            );
            report.user_created = true;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::user_store::SqliteUserStore;
    use tempfile::NamedTempFile;

    const SEED_TOML: &str = r#"
roles = ["Administrator", "Manager", "User"]

[user]
username = "admin"
email = "admin@example.com"
password = "ChangeMe!123"
roles = ["Administrator", "User"]
"#;

    fn create_test_store() -> (SqliteUserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = SqliteUserStore::new(temp_file.path().to_str().unwrap()).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_parse_seed_config() {
        let seed = parse_seed_config(SEED_TOML).unwrap();
        assert_eq!(seed.roles.len(), 3);
        assert_eq!(seed.user.username, "admin");
        assert_eq!(
            seed.user.roles,
            vec!["Administrator".to_string(), "User".to_string()]
        );
    }

    #[test]
    fn test_parse_seed_config_rejects_garbage() {
        assert!(parse_seed_config("not really toml [").is_err());
    }

    #[test]
    fn test_apply_seed_creates_roles_and_user() {
        let (store, _temp) = create_test_store();
        let seed = parse_seed_config(SEED_TOML).unwrap();

        let report = apply_seed(&store, &seed).unwrap();
        assert_eq!(report.roles_created, 3);
        assert_eq!(report.roles_existing, 0);
        assert!(report.user_created);

        let admin = store.find_user_by_username("admin").unwrap().unwrap();
        assert_eq!(
            admin.roles,
            vec!["Administrator".to_string(), "User".to_string()]
        );
        assert!(store.verify_password("admin", "ChangeMe!123").unwrap());
    }

    #[test]
    fn test_apply_seed_is_idempotent() {
        let (store, _temp) = create_test_store();
        let seed = parse_seed_config(SEED_TOML).unwrap();

        apply_seed(&store, &seed).unwrap();
        let second = apply_seed(&store, &seed).unwrap();

        assert_eq!(second.roles_created, 0);
        assert_eq!(second.roles_existing, 3);
        assert!(!second.user_created);

        // Second pass left the user untouched.
        let admin = store.find_user_by_username("admin").unwrap().unwrap();
        assert_eq!(admin.roles.len(), 2);
    }

    #[test]
    fn test_apply_seed_fails_when_user_role_not_declared() {
        let (store, _temp) = create_test_store();
        let seed = parse_seed_config(
            r#"
roles = ["User"]

[user]
username = "admin"
email = "admin@example.com"
password = "ChangeMe!123"
roles = ["Administrator"]
"#,
        )
        .unwrap();

        assert!(apply_seed(&store, &seed).is_err());
    }
}
