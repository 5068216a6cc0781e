//! Default GitHub domain allow-list.
//!
//! Order matters: the bulk hosts listing is projected in this order.

/// GitHub-related domains resolved and served by default.
pub const DEFAULT_DOMAINS: &[&str] = &[
    "github.githubassets.com",
    "central.github.com",
    "desktop.githubusercontent.com",
    "camo.githubusercontent.com",
    "github.map.fastly.net",
    "github.global.ssl.fastly.net",
    "gist.github.com",
    "github.io",
    "github.com",
    "api.github.com",
    "raw.githubusercontent.com",
    "user-images.githubusercontent.com",
    "favicons.githubusercontent.com",
    "avatars5.githubusercontent.com",
    "avatars4.githubusercontent.com",
    "avatars3.githubusercontent.com",
    "avatars2.githubusercontent.com",
    "avatars1.githubusercontent.com",
    "avatars0.githubusercontent.com",
    "avatars.githubusercontent.com",
    "codeload.github.com",
    "github-cloud.s3.amazonaws.com",
    "github-com.s3.amazonaws.com",
    "github-production-release-asset-2e65be.s3.amazonaws.com",
    "github-production-user-asset-6210df.s3.amazonaws.com",
    "github-production-repository-file-5c1aeb.s3.amazonaws.com",
    "githubstatus.com",
    "github.community",
    "media.githubusercontent.com",
    "objects.githubusercontent.com",
    "raw.github.com",
    "copilot-proxy.githubusercontent.com",
];

/// Owned copy of [`DEFAULT_DOMAINS`], used as the configuration default.
#[must_use]
pub fn default_domains() -> Vec<String> {
    DEFAULT_DOMAINS.iter().map(ToString::to_string).collect()
}

/// Find the allow-list spelling of `domain` (case-insensitive, trailing dot ignored).
#[must_use]
pub fn canonical<'a, S: AsRef<str>>(allow_list: &'a [S], domain: &str) -> Option<&'a str> {
    let domain = domain.trim_end_matches('.');
    if domain.is_empty() {
        return None;
    }
    allow_list
        .iter()
        .map(|d| d.as_ref())
        .find(|d| d.eq_ignore_ascii_case(domain))
}
