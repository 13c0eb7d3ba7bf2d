//! Accounts: users, their settings row and opaque API tokens.

use super::crud::CrudService;
use super::repository::{Assignments, Repository};
use crate::error::AppError;
use crate::model::{AuthToken, User, UserSettings};
use crate::query::PageRequest;
use crate::sql::{self, column_list, quoted, Conditions, SqlParam};
use crate::store::Tables;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm as ArgonAlgorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use sqlx::PgPool;

fn argon() -> Result<Argon2<'static>, AppError> {
    let params = Params::new(19456, 2, 1, None).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Argon2::new(ArgonAlgorithm::Argon2id, Version::V0x13, params))
}

/// PHC string for storage in `password_hash`.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .to_string())
}

/// `false` for a wrong password and for an unreadable stored hash.
pub fn verify_password(phc: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(phc) else {
        tracing::warn!("stored password hash is not a PHC string");
        return false;
    };
    match argon() {
        Ok(a) => a.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

fn new_token_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub struct UserRepo<'a> {
    pool: &'a PgPool,
    tables: &'a Tables,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool, tables: &'a Tables) -> Self {
        UserRepo { pool, tables }
    }

    fn from_clause(&self) -> String {
        format!("{} u", self.tables.users)
    }

    fn active(alias: &'static str) -> Conditions {
        let mut c = Conditions::with_alias(alias);
        c.is_true("is_active");
        c
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let mut c = Self::active("u");
        c.eq("username", username);
        let q = sql::select(&column_list(Some("u"), User::COLUMNS), &self.from_clause(), &c, "", None, None);
        CrudService::fetch_optional(self.pool, &q).await
    }

    /// The user when `username` exists, is active and `password` matches.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>, AppError> {
        let user = self.find_by_username(username).await?;
        Ok(user.filter(|u| verify_password(&u.password_hash, password)))
    }

    /// Issues the user's token on first call and returns the same one afterwards.
    pub async fn token_for(&self, user_id: i64) -> Result<AuthToken, AppError> {
        let insert = format!(
            "INSERT INTO {} ({}, {}) VALUES ($1, $2) ON CONFLICT ({}) DO NOTHING",
            self.tables.auth_tokens,
            quoted("key"),
            quoted("user_id"),
            quoted("user_id")
        );
        let created = CrudService::execute(
            self.pool,
            &insert,
            &[SqlParam::from(new_token_key()), SqlParam::from(user_id)],
        )
        .await?;
        if created > 0 {
            tracing::info!(user_id, "auth token issued");
        }
        let mut c = Conditions::new();
        c.eq("user_id", user_id);
        let q = sql::select(
            &column_list(None, &["key", "user_id", "created_at"]),
            &self.tables.auth_tokens,
            &c,
            "",
            None,
            None,
        );
        CrudService::fetch_one(self.pool, &q).await
    }

    /// Active owner of a token key.
    pub async fn by_token(&self, key: &str) -> Result<Option<User>, AppError> {
        let mut c = Self::active("u");
        c.eq_in("t", "key", key);
        let from = format!(
            "{} u JOIN {} t ON t.{} = u.{}",
            self.tables.users,
            self.tables.auth_tokens,
            quoted("user_id"),
            quoted("id")
        );
        let q = sql::select(&column_list(Some("u"), User::COLUMNS), &from, &c, "", None, None);
        CrudService::fetch_optional(self.pool, &q).await
    }

    pub async fn settings(&self, user_id: i64) -> Result<Option<UserSettings>, AppError> {
        let mut c = Conditions::new();
        c.eq("user_id", user_id);
        let q = sql::select(
            &column_list(None, UserSettings::COLUMNS),
            &self.tables.user_settings,
            &c,
            "",
            None,
            None,
        );
        CrudService::fetch_optional(self.pool, &q).await
    }

    pub async fn update_settings(&self, user_id: i64, values: &Assignments) -> Result<Option<UserSettings>, AppError> {
        let Some(current) = self.settings(user_id).await? else {
            return Ok(None);
        };
        let q = sql::update(
            &self.tables.user_settings,
            current.id,
            values,
            false,
            &[],
            &column_list(None, UserSettings::COLUMNS),
        );
        CrudService::fetch_optional(self.pool, &q).await
    }
}

#[async_trait]
impl Repository for UserRepo<'_> {
    type Record = User;
    type Filter = ();

    /// Inserts the user and a default settings row in one transaction.
    async fn create(&self, values: &Assignments) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;
        let q = sql::insert(&self.tables.users, values, &column_list(None, User::COLUMNS));
        let user: User = CrudService::fetch_one(&mut *tx, &q).await?;
        let q = sql::insert(
            &self.tables.user_settings,
            &[("user_id", SqlParam::from(user.id))],
            &column_list(None, UserSettings::COLUMNS),
        );
        let _settings: UserSettings = CrudService::fetch_one(&mut *tx, &q).await?;
        tx.commit().await?;
        tracing::info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    async fn get(&self, id: i64) -> Result<Option<User>, AppError> {
        let mut c = Self::active("u");
        c.eq("id", id);
        let q = sql::select(&column_list(Some("u"), User::COLUMNS), &self.from_clause(), &c, "", None, None);
        CrudService::fetch_optional(self.pool, &q).await
    }

    async fn list(&self, _filter: &(), page: &PageRequest) -> Result<(Vec<User>, i64), AppError> {
        let c = Self::active("u");
        let count = CrudService::count(self.pool, &sql::count(&self.from_clause(), &c)).await?;
        let q = sql::select(
            &column_list(Some("u"), User::COLUMNS),
            &self.from_clause(),
            &c,
            "u.\"username\" ASC, u.\"id\" ASC",
            Some(page.limit()),
            Some(page.offset()),
        );
        let rows = CrudService::fetch_all(self.pool, &q).await?;
        Ok((rows, count))
    }

    async fn update(&self, id: i64, values: &Assignments) -> Result<Option<User>, AppError> {
        let q = sql::update(
            &self.tables.users,
            id,
            values,
            false,
            &["\"is_active\" IS TRUE"],
            &column_list(None, User::COLUMNS),
        );
        CrudService::fetch_optional(self.pool, &q).await
    }

    /// Deletes the account; settings, tokens and posts go with it.
    async fn remove(&self, id: i64) -> Result<bool, AppError> {
        let q = sql::delete(&self.tables.users, id);
        let n = CrudService::execute(self.pool, &q.sql, &q.params).await?;
        if n > 0 {
            tracing::info!(user_id = id, "user deleted");
        }
        Ok(n > 0)
    }
}
