use serde::{Deserialize, Serialize};

use crate::inference::InferenceService;
use crate::users::models::UserAccount;
use crate::users::store::CredentialStore;

/// Shared Application State
pub struct AppState {
    pub inference: InferenceService,
    pub users: CredentialStore,
}

// --- DTOs (Data Transfer Objects) ---

#[derive(Deserialize)]
pub struct PredictRequest {
    /// Data-URI style payload: a scheme segment, a comma, then base64 image
    /// bytes.
    pub uri: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

#[derive(Serialize)]
pub struct PredictResponse {
    pub prediction: String,
    /// Rendered as text on the wire.
    pub probability: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub fullname: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account as returned from register and login. The password field carries
/// the stored hash, never the plaintext that came in with the request.
#[derive(Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub email: String,
    pub fullname: String,
    pub password: String,
}

impl From<UserAccount> for AccountResponse {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            email: account.email,
            fullname: account.fullname,
            password: account.password_hash,
        }
    }
}

/// Account as returned from the listing endpoint. No password field at all;
/// exposing stored hashes in a bulk listing serves no caller.
#[derive(Serialize)]
pub struct ListedAccount {
    pub id: i64,
    pub email: String,
    pub fullname: String,
}

impl From<UserAccount> for ListedAccount {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.id,
            email: account.email,
            fullname: account.fullname,
        }
    }
}
