use sqlx::FromRow;

/// One row of the `users` table. `password_hash` is the bcrypt digest
/// written at registration, never the plaintext.
#[derive(Debug, Clone, FromRow)]
pub struct UserAccount {
    pub id: i64,
    pub email: String,
    pub fullname: String,
    pub password_hash: String,
}
