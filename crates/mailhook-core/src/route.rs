//! Destination-domain routing.

use std::collections::HashMap;

/// The domain key matched when no explicit route applies.
pub const WILDCARD: &str = "*";

/// Mapping from destination domain to callback URL.
///
/// Built once at startup and shared immutably (behind an `Arc`) by
/// every session; never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, String>,
}

impl RouteTable {
    /// Creates an empty route table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with only the wildcard route installed.
    #[must_use]
    pub fn with_wildcard(url: impl Into<String>) -> Self {
        let mut table = Self::new();
        table.insert(WILDCARD, url);
        table
    }

    /// Installs a route. Domains are matched case-insensitively.
    pub fn insert(&mut self, domain: impl Into<String>, url: impl Into<String>) {
        self.routes.insert(domain.into().to_lowercase(), url.into());
    }

    /// Resolves a destination domain to its callback URL.
    ///
    /// An explicit route wins; otherwise the wildcard route, if
    /// installed, matches every domain.
    #[must_use]
    pub fn resolve(&self, domain: &str) -> Option<&str> {
        self.routes
            .get(&domain.to_lowercase())
            .or_else(|| self.routes.get(WILDCARD))
            .map(String::as_str)
    }

    /// Number of installed routes, wildcard included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_route() {
        let mut table = RouteTable::new();
        table.insert("hooks.example.com", "http://callback.one/");
        assert_eq!(
            table.resolve("hooks.example.com"),
            Some("http://callback.one/")
        );
    }

    #[test]
    fn test_explicit_route_case_insensitive() {
        let mut table = RouteTable::new();
        table.insert("Hooks.Example.COM", "http://callback.one/");
        assert_eq!(
            table.resolve("hooks.example.com"),
            Some("http://callback.one/")
        );
    }

    #[test]
    fn test_wildcard_fallback() {
        let mut table = RouteTable::with_wildcard("http://fallback/");
        table.insert("hooks.example.com", "http://callback.one/");
        assert_eq!(table.resolve("anything.org"), Some("http://fallback/"));
        assert_eq!(
            table.resolve("hooks.example.com"),
            Some("http://callback.one/")
        );
    }

    #[test]
    fn test_no_route_no_wildcard() {
        let mut table = RouteTable::new();
        table.insert("hooks.example.com", "http://callback.one/");
        assert_eq!(table.resolve("nomatch.org"), None);
    }

    #[test]
    fn test_empty_table() {
        let table = RouteTable::new();
        assert!(table.is_empty());
        assert_eq!(table.resolve("any.org"), None);
    }
}
