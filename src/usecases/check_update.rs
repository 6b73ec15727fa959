//! Use case: check GitHub releases for a newer version.

use std::time::Duration;

use serde_json::Value;

use crate::constants::{GITHUB_REPO, UPDATE_CHECK_TIMEOUT_SECS};

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateInfo {
    pub current: String,
    pub latest: String,
    pub download_url: String,
    pub release_url: String,
}

/// Ask GitHub for the latest release. Returns `None` when up to date, on
/// any network problem, or when the tag does not parse; an update check
/// must never get in the user's way.
pub async fn check_for_update() -> Option<UpdateInfo> {
    let url = format!("https://api.github.com/repos/{}/releases/latest", GITHUB_REPO);
    let response = crate::utils::http::client()
        .get(&url)
        .header("Accept", "application/vnd.github.v3+json")
        .header("User-Agent", crate::APP_NAME)
        .timeout(Duration::from_secs(UPDATE_CHECK_TIMEOUT_SECS))
        .send()
        .await
        .ok()?;
    if !response.status().is_success() {
        return None;
    }
    let data: Value = response.json().await.ok()?;

    let tag = data["tag_name"].as_str().unwrap_or("");
    if tag.is_empty() {
        return None;
    }
    if parse_semver(tag) <= parse_semver(crate::APP_VERSION) {
        return None;
    }

    let fallback_url = format!("https://github.com/{}/releases/latest", GITHUB_REPO);
    let release_url = data["html_url"].as_str().unwrap_or(&fallback_url).to_string();
    let download_url = data["assets"][0]["browser_download_url"]
        .as_str()
        .unwrap_or(&release_url)
        .to_string();

    Some(UpdateInfo {
        current: crate::APP_VERSION.to_string(),
        latest: tag.trim_start_matches('v').to_string(),
        download_url,
        release_url,
    })
}

/// Parse a semver string into a comparable tuple. Supports `1.2.3`,
/// `v1.2.3`, and pre-release suffixes like `1.2.3-alpha.2`; a pre-release
/// sorts below the matching release. Unparseable input sorts below
/// everything.
fn parse_semver(version: &str) -> (u64, u64, u64, u8, u64) {
    let v = version.trim().trim_start_matches('v');
    let (core, pre) = match v.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (v, None),
    };

    let mut parts = core.split('.');
    let (major, minor, patch) = match (
        parts.next().and_then(|p| p.parse::<u64>().ok()),
        parts.next().and_then(|p| p.parse::<u64>().ok()),
        parts.next().and_then(|p| p.parse::<u64>().ok()),
    ) {
        (Some(major), Some(minor), Some(patch)) => (major, minor, patch),
        _ => return (0, 0, 0, 0, 0),
    };
    if parts.next().is_some() {
        return (0, 0, 0, 0, 0);
    }

    match pre {
        // a plain release sorts above any of its pre-releases
        None => (major, minor, patch, 1, 0),
        Some(pre) => {
            let trailing_digits: String = pre
                .chars()
                .rev()
                .take_while(|c| c.is_ascii_digit())
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            let pre_num = trailing_digits.parse().unwrap_or(0);
            (major, minor, patch, 0, pre_num)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_ordering() {
        assert!(parse_semver("1.2.3") < parse_semver("1.2.4"));
        assert!(parse_semver("1.2.3") < parse_semver("1.3.0"));
        assert!(parse_semver("1.9.0") < parse_semver("2.0.0"));
        assert_eq!(parse_semver("1.2.3"), parse_semver("v1.2.3"));
    }

    #[test]
    fn test_prerelease_sorts_below_release() {
        assert!(parse_semver("1.2.3-alpha.1") < parse_semver("1.2.3"));
        assert!(parse_semver("1.2.3-alpha.1") < parse_semver("1.2.3-alpha.2"));
        assert!(parse_semver("1.2.3-rc.9") < parse_semver("1.2.3"));
    }

    #[test]
    fn test_invalid_versions_sort_lowest() {
        assert_eq!(parse_semver("nonsense"), (0, 0, 0, 0, 0));
        assert_eq!(parse_semver("1.2"), (0, 0, 0, 0, 0));
        assert_eq!(parse_semver("1.2.3.4"), (0, 0, 0, 0, 0));
        assert!(parse_semver("garbage") < parse_semver("0.0.1"));
    }
}
