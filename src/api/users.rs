// Current-user endpoint
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Fetch the signed-in user's profile. Used right after auth to confirm
/// the token works and to greet the user.
pub async fn current_user_profile(
    token: &str,
) -> Result<UserProfile, Box<dyn std::error::Error>> {
    let response =
        crate::utils::http::retry_get_with_auth("https://api.spotify.com/v1/me", token).await?;
    if !response.status().is_success() {
        return Err(format!("Spotify API returned status: {}", response.status()).into());
    }
    Ok(response.json().await?)
}

/// Blocking twin for the sync worker; playlist creation needs the user id.
pub fn current_user_id(token: &str) -> Result<String, Box<dyn std::error::Error>> {
    let response =
        crate::utils::http::blocking_get_with_auth("https://api.spotify.com/v1/me", token)?;
    if !response.status().is_success() {
        return Err(format!("Spotify API returned status: {}", response.status()).into());
    }
    let profile: UserProfile = response.json()?;
    Ok(profile.id)
}
