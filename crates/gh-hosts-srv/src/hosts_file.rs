//! Hosts file rendering.

use chrono::{DateTime, FixedOffset, Utc};
use gh_hosts_core::HostEntry;

/// Placeholder replaced by the host lines.
pub const CONTENT_PLACEHOLDER: &str = "{content}";

/// Placeholder replaced by the generation time.
pub const UPDATE_TIME_PLACEHOLDER: &str = "{updateTime}";

/// Column the domain starts at.
pub const IP_COLUMN_WIDTH: usize = 30;

/// Built-in hosts file template.
pub const DEFAULT_TEMPLATE: &str = "# GitHub Hosts Start
# Generated by gh-hosts from DNS-over-HTTPS answers.
# Append to /etc/hosts (C:\\Windows\\System32\\drivers\\etc\\hosts on Windows),
# then flush the local DNS cache.

{content}

# Update time: {updateTime}
# GitHub Hosts End
";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";

/// Renders host entries into a hosts file.
#[derive(Debug, Clone)]
pub struct HostsFormatter {
    template: String,
    offset: FixedOffset,
}

impl HostsFormatter {
    /// Create a formatter; the template must contain `{content}`.
    pub fn new(template: impl Into<String>, utc_offset_hours: i32) -> crate::Result<Self> {
        let template = template.into();
        if !template.contains(CONTENT_PLACEHOLDER) {
            return Err(crate::SrvError::Template(format!(
                "template is missing {CONTENT_PLACEHOLDER}"
            )));
        }
        let offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                crate::SrvError::Template(format!("invalid UTC offset: {utc_offset_hours}h"))
            })?;
        Ok(Self { template, offset })
    }

    /// Render `entries` stamped with `generated_at`.
    pub fn format(&self, entries: &[HostEntry], generated_at: DateTime<Utc>) -> String {
        let update_time = generated_at
            .with_timezone(&self.offset)
            .format(TIME_FORMAT)
            .to_string();

        self.template
            .replace(CONTENT_PLACEHOLDER, &format_lines(entries))
            .replace(UPDATE_TIME_PLACEHOLDER, &update_time)
    }

    /// Render `entries` stamped with the current time.
    pub fn render(&self, entries: &[HostEntry]) -> String {
        self.format(entries, Utc::now())
    }
}

/// One `ip<padding>domain` line per entry.
pub fn format_lines(entries: &[HostEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{:<width$}{}", e.ip().to_string(), e.domain(), width = IP_COLUMN_WIDTH))
        .collect::<Vec<_>>()
        .join("\n")
}
