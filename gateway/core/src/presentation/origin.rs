// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Cross-origin allow-list shared by both HTTP bindings.
//!
//! Checked before any session logic runs. An empty allow-list means
//! unrestricted, the local/dev posture.

/// Allow-list of exact origins plus `*.domain` wildcard-suffix entries.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<String>,
}

impl OriginPolicy {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    /// Whether a request carrying this `Origin` header value may proceed.
    /// Requests without an `Origin` header are always permitted; browsers
    /// attach one, non-browser clients need not.
    pub fn permits(&self, origin: Option<&str>) -> bool {
        if self.allowed.is_empty() {
            return true;
        }
        let Some(origin) = origin else {
            return true;
        };

        self.allowed.iter().any(|entry| {
            if let Some(suffix) = entry.strip_prefix("*.") {
                match origin_host(origin) {
                    Some(host) => host == suffix || host.ends_with(&format!(".{}", suffix)),
                    None => false,
                }
            } else {
                entry == origin
            }
        })
    }
}

/// Extract the host from an origin value like `https://app.s2t.dev:8443`.
fn origin_host(origin: &str) -> Option<&str> {
    let rest = origin.split_once("://").map(|(_, rest)| rest)?;
    let host = rest.split(['/', ':']).next()?;
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allow_list_passes_everything() {
        let policy = OriginPolicy::new(vec![]);
        assert!(policy.permits(Some("https://evil.example")));
        assert!(policy.permits(None));
    }

    #[test]
    fn test_exact_match() {
        let policy = OriginPolicy::new(vec!["https://app.s2t.dev".to_string()]);
        assert!(policy.permits(Some("https://app.s2t.dev")));
        assert!(!policy.permits(Some("https://other.s2t.dev")));
        assert!(!policy.permits(Some("http://app.s2t.dev")));
    }

    #[test]
    fn test_wildcard_subdomain_suffix() {
        let policy = OriginPolicy::new(vec!["*.s2t.dev".to_string()]);
        assert!(policy.permits(Some("https://app.s2t.dev")));
        assert!(policy.permits(Some("https://deep.nested.s2t.dev")));
        assert!(policy.permits(Some("https://s2t.dev")));
        assert!(policy.permits(Some("https://app.s2t.dev:8443")));
        assert!(!policy.permits(Some("https://s2t.dev.evil.example")));
        assert!(!policy.permits(Some("https://nots2t.dev")));
    }

    #[test]
    fn test_absent_origin_header_is_permitted() {
        let policy = OriginPolicy::new(vec!["https://app.s2t.dev".to_string()]);
        assert!(policy.permits(None));
    }

    #[test]
    fn test_origin_host_extraction() {
        assert_eq!(origin_host("https://app.s2t.dev"), Some("app.s2t.dev"));
        assert_eq!(origin_host("https://app.s2t.dev:8443"), Some("app.s2t.dev"));
        assert_eq!(origin_host("not-a-url"), None);
    }
}
