use std::io::Cursor;

use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::bytes::Bytes;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, Result};
use crate::middleware_layer::auth::send_authorized;
use crate::models::response::ApiMessage;
use crate::models::user::User;
use crate::state::AppState;
use crate::validation::auth::validate_email;

/// The chunk size the profile-image body is streamed in.
const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// A profile image ready for upload.
#[derive(Debug, Clone)]
pub struct ProfileImage {
    /// The file name reported to the backend.
    pub file_name: String,
    /// The raw image bytes.
    pub bytes: Vec<u8>,
}

impl ProfileImage {
    /// Loads a profile image from disk.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the image file.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `ProfileImage`.
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                AppError::Validation("Image path has no usable file name".to_string())
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { file_name, bytes })
    }

    /// The image's MIME type, sniffed from its bytes.
    fn mime_type(&self) -> &'static str {
        infer::get(&self.bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or("application/octet-stream")
    }
}

/// Progress notifications emitted while a profile image uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadProgress {
    /// Bytes handed to the transport so far, out of the total body size.
    Sent {
        /// Cumulative bytes sent.
        bytes_sent: u64,
        /// Total bytes in the image body.
        total_bytes: u64,
    },
}

/// Fetches all users from the directory.
///
/// On success the session store's user-list cache is refreshed wholesale; a
/// failed call leaves the previous cache in place.
///
/// # Arguments
///
/// * `state` - The client state.
///
/// # Returns
///
/// A `Result` containing the fetched users.
pub async fn list(state: &AppState) -> Result<Vec<User>> {
    let response = send_authorized(state, state.http.get(state.url("/user/list"))).await?;
    if !response.status().is_success() {
        return Err(AppError::from_response(response).await);
    }

    let users: Vec<User> = response.json().await?;
    state.store.cache_user_list(&users).await?;
    tracing::debug!("✅ Fetched {} users", users.len());
    Ok(users)
}

/// Returns the last-fetched user list from the local cache, if any.
///
/// No staleness tracking: whatever the last successful [`list`] stored.
pub async fn cached_list(state: &AppState) -> Option<Vec<User>> {
    state.store.cached_user_list().await
}

/// Creates a user in the directory.
///
/// # Arguments
///
/// * `state` - The client state.
/// * `current_username` - The acting user's username.
/// * `user` - The user record to create.
/// * `image` - An optional profile image to attach.
///
/// # Returns
///
/// A `Result` containing the created `User`.
pub async fn add(
    state: &AppState,
    current_username: &str,
    user: &User,
    image: Option<ProfileImage>,
) -> Result<User> {
    tracing::info!("📝 Adding user: {}", user.username);
    let form = user_form(current_username, user, image)?;
    let response =
        send_authorized(state, state.http.post(state.url("/user/add")).multipart(form)).await?;
    if !response.status().is_success() {
        return Err(AppError::from_response(response).await);
    }

    let created: User = response.json().await?;
    tracing::info!("✅ User added: {}", created.username);
    Ok(created)
}

/// Updates a user in the directory.
///
/// # Arguments
///
/// * `state` - The client state.
/// * `current_username` - The username the record is currently stored under.
/// * `user` - The updated user record.
/// * `image` - An optional replacement profile image.
///
/// # Returns
///
/// A `Result` containing the updated `User`.
pub async fn update(
    state: &AppState,
    current_username: &str,
    user: &User,
    image: Option<ProfileImage>,
) -> Result<User> {
    tracing::info!("📝 Updating user: {}", current_username);
    let form = user_form(current_username, user, image)?;
    let response = send_authorized(
        state,
        state.http.post(state.url("/user/update")).multipart(form),
    )
    .await?;
    if !response.status().is_success() {
        return Err(AppError::from_response(response).await);
    }

    let updated: User = response.json().await?;
    tracing::info!("✅ User updated: {}", updated.username);
    Ok(updated)
}

/// Deletes a user from the directory.
///
/// # Arguments
///
/// * `state` - The client state.
/// * `id` - The backend's numeric identifier for the user.
///
/// # Returns
///
/// A `Result` containing the backend's status envelope.
pub async fn delete(state: &AppState, id: i64) -> Result<ApiMessage> {
    tracing::info!("🗑️ Deleting user: {}", id);
    let response = send_authorized(
        state,
        state.http.delete(state.url(&format!("/user/delete/{}", id))),
    )
    .await?;
    if !response.status().is_success() {
        return Err(AppError::from_response(response).await);
    }

    let message: ApiMessage = response.json().await?;
    tracing::info!("✅ User deleted: {}", id);
    Ok(message)
}

/// Triggers a password reset for the given email address.
///
/// # Arguments
///
/// * `state` - The client state.
/// * `email` - The email address of the account to reset.
///
/// # Returns
///
/// A `Result` containing the backend's status envelope.
pub async fn reset_password(state: &AppState, email: &str) -> Result<ApiMessage> {
    validate_email(email)?;
    tracing::info!("🔑 Password reset requested for: {}", email);
    let response = send_authorized(
        state,
        state
            .http
            .get(state.url(&format!("/user/resetpassword/{}", email))),
    )
    .await?;
    if !response.status().is_success() {
        return Err(AppError::from_response(response).await);
    }

    let message: ApiMessage = response.json().await?;
    Ok(message)
}

/// Uploads a new profile image for a user.
///
/// The image body is streamed in chunks; each chunk handed to the transport
/// emits an [`UploadProgress::Sent`] notification through `progress` before
/// the terminal result.
///
/// # Arguments
///
/// * `state` - The client state.
/// * `username` - The user whose image is being replaced.
/// * `image` - The new profile image.
/// * `progress` - An optional channel for progress notifications.
///
/// # Returns
///
/// A `Result` containing the updated `User`.
pub async fn update_profile_image(
    state: &AppState,
    username: &str,
    image: ProfileImage,
    progress: Option<UnboundedSender<UploadProgress>>,
) -> Result<User> {
    tracing::info!("🖼️ Uploading profile image for: {}", username);
    let mime = image.mime_type();
    let file_name = image.file_name.clone();
    let total_bytes = image.bytes.len() as u64;

    let body = reqwest::Body::wrap_stream(counted_stream(image.bytes, total_bytes, progress));
    let part = Part::stream_with_length(body, total_bytes)
        .file_name(file_name)
        .mime_str(mime)?;
    let form = Form::new()
        .text("username", username.to_string())
        .part("profileImage", part);

    let response = send_authorized(
        state,
        state
            .http
            .post(state.url("/user/updateProfileImage"))
            .multipart(form),
    )
    .await?;
    if !response.status().is_success() {
        return Err(AppError::from_response(response).await);
    }

    let updated: User = response.json().await?;
    tracing::info!("✅ Profile image updated for: {}", updated.username);
    Ok(updated)
}

/// Assembles the multipart form the add and update endpoints expect.
///
/// # Arguments
///
/// * `current_username` - The acting or previous username, per the endpoint.
/// * `user` - The user record being shipped.
/// * `image` - An optional profile image part.
///
/// # Returns
///
/// A `Result` containing the assembled `Form`.
fn user_form(current_username: &str, user: &User, image: Option<ProfileImage>) -> Result<Form> {
    let mut form = Form::new()
        .text("currentUserName", current_username.to_string())
        .text("firstName", user.first_name.clone())
        .text("lastName", user.last_name.clone())
        .text("username", user.username.clone())
        .text("email", user.email.clone())
        .text("role", user.role.clone())
        .text("isActive", user.active.to_string())
        .text("isNonLocked", user.not_locked.to_string());

    if let Some(image) = image {
        let mime = image.mime_type();
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(mime)?;
        form = form.part("profileImage", part);
    }

    Ok(form)
}

/// Wraps the image bytes in a chunked stream that reports cumulative progress
/// as the transport pulls each chunk.
fn counted_stream(
    bytes: Vec<u8>,
    total_bytes: u64,
    progress: Option<UnboundedSender<UploadProgress>>,
) -> impl futures::Stream<Item = std::io::Result<Bytes>> {
    let mut bytes_sent: u64 = 0;
    ReaderStream::with_capacity(Cursor::new(bytes), UPLOAD_CHUNK_BYTES).map(move |chunk| {
        if let Ok(chunk) = &chunk {
            bytes_sent += chunk.len() as u64;
            if let Some(progress) = &progress {
                let _ = progress.send(UploadProgress::Sent {
                    bytes_sent,
                    total_bytes,
                });
            }
        }
        chunk
    })
}
