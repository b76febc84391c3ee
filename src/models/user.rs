use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A user account in the backend directory.
///
/// Owned by the backend; the client only ever holds read-through copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The backend's numeric identifier for the user.
    #[serde(default)]
    pub id: i64,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The user's username.
    pub username: String,
    /// The user's email address.
    pub email: String,
    /// Where the user's profile image can be fetched from.
    #[serde(default)]
    pub profile_image_url: Option<String>,
    /// The timestamp of the user's last login.
    #[serde(default)]
    pub last_login_date: Option<DateTime<Utc>>,
    /// The timestamp when the account was created.
    #[serde(default)]
    pub join_date: Option<DateTime<Utc>>,
    /// The user's role.
    pub role: String,
    /// Whether the account is active.
    #[serde(default)]
    pub active: bool,
    /// Whether the account is not locked.
    #[serde(default)]
    pub not_locked: bool,
}

/// The credentials sent to the login endpoint.
///
/// The password is wiped from memory when the value is dropped.
#[derive(Clone, Serialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    /// The username to authenticate as.
    #[zeroize(skip)]
    pub username: String,
    /// The password.
    pub password: String,
}

/// The payload sent to the registration endpoint.
///
/// The backend generates the initial password and emails it to the new account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// The new user's first name.
    pub first_name: String,
    /// The new user's last name.
    pub last_name: String,
    /// The new user's username.
    pub username: String,
    /// The new user's email address.
    pub email: String,
}
