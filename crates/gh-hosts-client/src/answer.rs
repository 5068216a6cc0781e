//! DNS-over-HTTPS JSON response types.

use serde::Deserialize;
use std::net::Ipv4Addr;

/// DNS record type code for A records.
pub const RECORD_TYPE_A: u16 = 1;

/// Response body of the DoH JSON API (`application/dns-json`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DohResponse {
    /// DNS response code (0 = NOERROR)
    #[serde(default)]
    pub status: u32,

    /// Echoed question section
    #[serde(default)]
    pub question: Vec<DohQuestion>,

    /// Answer section, possibly including CNAME hops
    #[serde(default)]
    pub answer: Vec<DohAnswer>,
}

/// Question entry
#[derive(Debug, Clone, Deserialize)]
pub struct DohQuestion {
    /// Queried name
    pub name: String,

    /// Queried record type
    #[serde(rename = "type")]
    pub record_type: u16,
}

/// Answer entry
#[derive(Debug, Clone, Deserialize)]
pub struct DohAnswer {
    /// Owner name
    #[serde(default)]
    pub name: String,

    /// Record type code
    #[serde(rename = "type")]
    pub record_type: u16,

    /// Time to live in seconds
    #[serde(rename = "TTL", default)]
    pub ttl: u32,

    /// Record data (an address for A records)
    #[serde(default)]
    pub data: String,
}

impl DohResponse {
    /// Data of the first A record, if any
    #[must_use]
    pub fn first_a_record(&self) -> Option<&str> {
        self.answer
            .iter()
            .find(|a| a.record_type == RECORD_TYPE_A)
            .map(|a| a.data.as_str())
    }

    /// First A record parsed as a strict dotted-quad IPv4 address
    #[must_use]
    pub fn first_ipv4(&self) -> Option<Ipv4Addr> {
        self.first_a_record().and_then(parse_dotted_quad)
    }
}

/// Parse exactly four dot-separated decimal octets.
#[must_use]
pub fn parse_dotted_quad(data: &str) -> Option<Ipv4Addr> {
    let data = data.trim();
    let well_formed = data.split('.').count() == 4
        && data
            .split('.')
            .all(|group| !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
        return None;
    }
    data.parse().ok()
}
