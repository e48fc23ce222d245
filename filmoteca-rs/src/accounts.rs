//! Accounts: registration and credential checks over the `usuarios` table.
//!
//! Passwords are stored as salted Argon2id PHC strings. Login looks accounts up
//! by email and verifies the submitted password against each stored hash; the
//! first verified account decides the outcome by its role id.

use std::sync::{Arc, OnceLock};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use sqlx::{FromRow, SqlitePool};
use tokio::task::spawn_blocking;
use tracing::{debug, info};

use crate::db::StoreError;
use crate::ids::{insert_with_fresh_id, Collection, IdSource};

/// Role ids as stored in `usuarios.role_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn from_id(role_id: i64) -> Option<Self> {
        match role_id {
            1 => Some(Role::User),
            2 => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub date_of_birth: String,
    pub country: String,
    pub terms_accepted: bool,
}

/// Result of a login attempt. Each variant selects a distinct view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Profile {
        role: Role,
        name: String,
        surname: String,
    },
    UnknownRole { role_id: i64 },
    NoMatch,
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    name: String,
    surname: String,
    password_hash: String,
    role_id: i64,
}

const INSERT: &str = "INSERT INTO usuarios \
    (id, nombre, apellido, email, password, fechaNacimiento, pais, terminos) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)";
const SELECT_BY_EMAIL: &str = "SELECT nombre AS name, apellido AS surname, \
    password AS password_hash, role_id FROM usuarios WHERE email = ? ORDER BY id";

#[derive(Debug, Clone)]
pub struct AccountStore {
    pool: SqlitePool,
    ids: Arc<dyn IdSource>,
}

impl AccountStore {
    pub fn new(pool: SqlitePool, ids: Arc<dyn IdSource>) -> Self {
        Self { pool, ids }
    }

    /// Create an account with the default user role and return its id.
    pub async fn register(&self, account: NewAccount) -> Result<i64, StoreError> {
        let NewAccount {
            name,
            surname,
            email,
            password,
            date_of_birth,
            country,
            terms_accepted,
        } = account;
        let password_hash = spawn_blocking(move || hash_password(&password)).await??;

        let pool = &self.pool;
        let id = insert_with_fresh_id(self.ids.as_ref(), Collection::Accounts, |id| {
            sqlx::query(INSERT)
                .bind(id)
                .bind(name.clone())
                .bind(surname.clone())
                .bind(email.clone())
                .bind(password_hash.clone())
                .bind(date_of_birth.clone())
                .bind(country.clone())
                .bind(i64::from(terms_accepted))
                .execute(pool)
        })
        .await?;
        info!(id, email = %email, "account registered");
        Ok(id)
    }

    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, StoreError> {
        let candidates = sqlx::query_as::<_, CredentialRow>(SELECT_BY_EMAIL)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;
        let known_email = !candidates.is_empty();

        let password = password.to_owned();
        let matched = spawn_blocking(move || {
            if candidates.is_empty() {
                // Pay for one verification anyway so unknown emails take as long.
                if let Some(decoy) = decoy_hash() {
                    verify_password(&password, decoy);
                }
                return None;
            }
            candidates
                .into_iter()
                .find(|row| verify_password(&password, &row.password_hash))
        })
        .await?;

        let Some(row) = matched else {
            debug!(email = %email, known_email, "login rejected");
            return Ok(LoginOutcome::NoMatch);
        };

        Ok(match Role::from_id(row.role_id) {
            Some(role) => {
                info!(email = %email, ?role, "login succeeded");
                LoginOutcome::Profile {
                    role,
                    name: row.name,
                    surname: row.surname,
                }
            }
            None => LoginOutcome::UnknownRole {
                role_id: row.role_id,
            },
        })
    }
}

fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| StoreError::Credential(err.to_string()))
}

/// Hash checked when no account has the submitted email.
fn decoy_hash() -> Option<&'static str> {
    static DECOY: OnceLock<Option<String>> = OnceLock::new();
    DECOY
        .get_or_init(|| hash_password("filmoteca-decoy").ok())
        .as_deref()
}

/// Unparseable stored hashes never verify.
fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
