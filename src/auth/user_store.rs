//! Credential Store
//! Mission: Persist users, roles, and memberships with SQLite + bcrypt

use crate::auth::models::User;
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;
use uuid::Uuid;

/// Capability interface over identity persistence.
///
/// The authentication endpoint depends only on this trait, so it can be
/// exercised against an in-memory fake without a real database.
pub trait CredentialStore: Send + Sync {
    /// Look up a user by username. Matching is case-insensitive.
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Check a candidate password against the stored hash. Unknown usernames
    /// report `false`, same as a mismatch.
    fn verify_password(&self, username: &str, password: &str) -> Result<bool>;

    /// Current role memberships, in assignment order.
    fn roles_of(&self, user_id: &Uuid) -> Result<Vec<String>>;

    fn create_user(&self, username: &str, email: &str, password: &str) -> Result<User>;

    fn create_role(&self, name: &str) -> Result<()>;

    fn role_exists(&self, name: &str) -> Result<bool>;

    /// Assign roles by name. Every named role must already exist; assignments
    /// the user already holds are kept as-is.
    fn add_user_to_roles(&self, user_id: &Uuid, roles: &[String]) -> Result<()>;

    /// Replace the user's password hash with one for `new_password`.
    fn change_password(&self, user_id: &Uuid, new_password: &str) -> Result<()>;
}

/// Credential store with SQLite backend
pub struct SqliteUserStore {
    db_path: String,
}

impl SqliteUserStore {
    /// Create a new store and initialize the schema.
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE COLLATE NOCASE NOT NULL,
                email TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS roles (
                id TEXT PRIMARY KEY,
                name TEXT UNIQUE NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_roles (
                user_id TEXT NOT NULL,
                role_id TEXT NOT NULL,
                PRIMARY KEY (user_id, role_id),
                FOREIGN KEY (user_id) REFERENCES users(id),
                FOREIGN KEY (role_id) REFERENCES roles(id)
            )",
            [],
        )?;

        Ok(())
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path).context("Failed to open identity database")
    }

    fn roles_for(conn: &Connection, user_id: &Uuid) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT r.name FROM roles r
             JOIN user_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = ?1
             ORDER BY ur.rowid",
        )?;

        let roles = stmt
            .query_map(params![user_id.to_string()], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(roles)
    }
}

impl CredentialStore for SqliteUserStore {
    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.open()?;

        let mut stmt = conn.prepare(
            "SELECT id, username, email, password_hash, created_at
             FROM users WHERE username = ?1",
        )?;

        let user_result = stmt.query_row(params![username], |row| {
            let id: String = row.get(0)?;
            Ok(User {
                id: Uuid::parse_str(&id).unwrap_or_default(),
                username: row.get(1)?,
                email: row.get(2)?,
                password_hash: row.get(3)?,
                roles: Vec::new(),
                created_at: row.get(4)?,
            })
        });

        match user_result {
            Ok(mut user) => {
                user.roles = Self::roles_for(&conn, &user.id)?;
                Ok(Some(user))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        match self.find_user_by_username(username)? {
            Some(user) => {
                let valid =
                    verify(password, &user.password_hash).context("Failed to verify password")?;
                Ok(valid)
            }
            None => Ok(false),
        }
    }

    fn roles_of(&self, user_id: &Uuid) -> Result<Vec<String>> {
        let conn = self.open()?;
        Self::roles_for(&conn, user_id)
    }

    fn create_user(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            roles: Vec::new(),
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.open()?;
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.username,
                user.email,
                user.password_hash,
                user.created_at,
            ],
        )
        .context("Failed to insert user")?;

        info!("✅ Created user: {}", user.username);

        Ok(user)
    }

    fn create_role(&self, name: &str) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO roles (id, name) VALUES (?1, ?2)",
            params![Uuid::new_v4().to_string(), name],
        )
        .context("Failed to insert role")?;

        info!("Created role: {}", name);

        Ok(())
    }

    fn role_exists(&self, name: &str) -> Result<bool> {
        let conn = self.open()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM roles WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    fn add_user_to_roles(&self, user_id: &Uuid, roles: &[String]) -> Result<()> {
        let conn = self.open()?;

        for role in roles {
            let role_id: String = conn
                .query_row(
                    "SELECT id FROM roles WHERE name = ?1",
                    params![role],
                    |row| row.get(0),
                )
                .with_context(|| format!("Role '{role}' does not exist"))?;

            conn.execute(
                "INSERT OR IGNORE INTO user_roles (user_id, role_id) VALUES (?1, ?2)",
                params![user_id.to_string(), role_id],
            )?;
        }

        Ok(())
    }

    fn change_password(&self, user_id: &Uuid, new_password: &str) -> Result<()> {
        let password_hash = hash(new_password, DEFAULT_COST).context("Failed to hash password")?;

        let conn = self.open()?;
        let rows_affected = conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, user_id.to_string()],
        )?;

        if rows_affected == 0 {
            anyhow::bail!("User not found");
        }

        info!("Password changed for user {}", user_id);

        Ok(())
    }
}
