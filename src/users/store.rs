use sqlx::SqlitePool;
use tokio::task;

use crate::error::CredentialError;
use crate::users::models::UserAccount;

/// Registration and credential verification over the `users` table.
///
/// Plaintext passwords only exist on the way into `bcrypt`; the store writes
/// and compares salted hashes. Hashing runs on blocking threads since bcrypt
/// is deliberately slow.
#[derive(Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
    cost: u32,
    // Verified against when the email is unknown, so a lookup miss costs the
    // same bcrypt work as a wrong password.
    dummy_hash: String,
}

impl CredentialStore {
    pub fn new(pool: SqlitePool, cost: u32) -> Result<Self, CredentialError> {
        let dummy_hash = bcrypt::hash("plantsafe.invalid", cost)?;
        Ok(Self {
            pool,
            cost,
            dummy_hash,
        })
    }

    /// Creates an account with a freshly salted hash of `password`.
    ///
    /// Uniqueness is enforced by the UNIQUE column constraint, so the check
    /// and the insert are one atomic statement; two concurrent registrations
    /// of the same email cannot both succeed.
    pub async fn register(
        &self,
        email: &str,
        fullname: &str,
        password: &str,
    ) -> Result<UserAccount, CredentialError> {
        let cost = self.cost;
        let password = password.to_owned();
        let hash = task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|_| CredentialError::Internal)??;

        let account = sqlx::query_as::<_, UserAccount>(
            "INSERT INTO users (email, fullname, password_hash) VALUES (?1, ?2, ?3) \
             RETURNING id, email, fullname, password_hash",
        )
        .bind(email)
        .bind(fullname)
        .bind(&hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) {
                CredentialError::DuplicateEmail
            } else {
                CredentialError::from(e)
            }
        })?;

        Ok(account)
    }

    /// Looks up the account by its unique email (zero or one row) and checks
    /// the password with bcrypt's own verification. Unknown email and wrong
    /// password return the identical error.
    pub async fn verify(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserAccount, CredentialError> {
        let account = sqlx::query_as::<_, UserAccount>(
            "SELECT id, email, fullname, password_hash FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let hash = match &account {
            Some(account) => account.password_hash.clone(),
            None => self.dummy_hash.clone(),
        };

        let password = password.to_owned();
        let matches = task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|_| CredentialError::Internal)??;

        match account {
            Some(account) if matches => Ok(account),
            _ => Err(CredentialError::InvalidCredentials),
        }
    }

    /// All accounts, ordered by id.
    pub async fn list(&self) -> Result<Vec<UserAccount>, CredentialError> {
        let accounts = sqlx::query_as::<_, UserAccount>(
            "SELECT id, email, fullname, password_hash FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }
}
