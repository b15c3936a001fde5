use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use password_hash::SaltString;
use rand_core::OsRng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};

use crate::entity::user;
use crate::lifecycle::Role;

#[derive(Debug)]
pub enum AuthError {
    NotFound,
    InvalidPassword,
    Db(sea_orm::DbErr),
    Hash(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::NotFound => write!(f, "User not found"),
            AuthError::InvalidPassword => write!(f, "Invalid password"),
            AuthError::Db(e) => write!(f, "Database error: {e}"),
            AuthError::Hash(e) => write!(f, "Hash error: {e}"),
        }
    }
}

impl std::error::Error for AuthError {}

pub struct Auth {
    db: DatabaseConnection,
}

impl Auth {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Expose the underlying DB connection for direct SeaORM queries.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Verify email/password against the user store, returning the model on
    /// success.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<user::Model, AuthError> {
        let found = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AuthError::Db)?
            .ok_or(AuthError::NotFound)?;

        let hash =
            PasswordHash::new(&found.password_hash).map_err(|e| AuthError::Hash(e.to_string()))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .map_err(|_| AuthError::InvalidPassword)?;

        Ok(found)
    }

    /// Create a user with an Argon2-hashed password. Used by the CLI;
    /// the signup endpoint goes through the same `hash_password`.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<user::Model, Box<dyn std::error::Error>> {
        let password_hash = Self::hash_password(password)?;
        let model = user::ActiveModel {
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            password_hash: Set(password_hash),
            role: Set(role.as_str().to_owned()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(model)
    }

    /// Return the total number of users in the store.
    pub async fn count_users(&self) -> Result<u64, Box<dyn std::error::Error>> {
        let count = user::Entity::find().count(&self.db).await?;
        Ok(count)
    }

    /// Hash a plaintext password with Argon2id + a random salt.
    pub fn hash_password(password: &str) -> Result<String, Box<dyn std::error::Error>> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| std::io::Error::other(e.to_string()))?
            .to_string();
        Ok(hash)
    }
}
