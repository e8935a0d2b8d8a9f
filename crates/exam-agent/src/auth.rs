//! Source-address allowlist guarding mutating requests.

use wildmatch::WildMatch;

/// Comma-separated glob patterns matched against the peer address.
///
/// Patterns are compared with the whole `ip:port` string of the peer, so a
/// pattern meant to cover every port of a host must end in `:*`.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    patterns: Vec<WildMatch>,
}

impl AllowList {
    /// Parses the raw flag value. An empty value allows every address.
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::default();
        }

        Self {
            patterns: raw.split(',').map(WildMatch::new).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns whether `remote_addr` may mutate instances.
    pub fn check_allowed_ip(&self, remote_addr: &str) -> bool {
        if self.patterns.is_empty() {
            return true;
        }

        self.patterns
            .iter()
            .any(|pattern| pattern.matches(remote_addr))
    }
}
