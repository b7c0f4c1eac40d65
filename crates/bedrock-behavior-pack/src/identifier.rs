//! Namespaced identifiers (`namespace:path`).

use std::fmt;

pub const DEFAULT_NAMESPACE: &str = "minecraft";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    namespace: String,
    path: String,
}

impl Identifier {
    /// Build from parts known to be valid.
    pub fn new(namespace: &str, path: &str) -> Self {
        Self {
            namespace: namespace.to_ascii_lowercase(),
            path: path.to_ascii_lowercase(),
        }
    }

    /// Parse `ns:path` or a bare `path` (which gets the `minecraft` namespace).
    /// Input is trimmed and lowercased; an empty namespace or path is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        let (namespace, path) = match raw.split_once(':') {
            Some((ns, path)) => (ns.to_string(), path.to_string()),
            None => (DEFAULT_NAMESPACE.to_string(), raw),
        };
        if namespace.is_empty() || path.is_empty() || path.contains(':') {
            return None;
        }
        Some(Self { namespace, path })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// Normalize an identifier string, falling back to the trimmed lowercase input
/// when it does not parse.
pub fn normalize(raw: &str) -> String {
    match Identifier::parse(raw) {
        Some(id) => id.to_string(),
        None => raw.trim().to_ascii_lowercase(),
    }
}

/// Split `minecraft:zombie<minecraft:as_baby>` into the entity id and its spawn event.
pub fn split_spawn_event(raw: &str) -> (&str, Option<&str>) {
    let raw = raw.trim();
    if let Some(start) = raw.find('<') {
        if raw.ends_with('>') {
            let event = raw[start + 1..raw.len() - 1].trim();
            let id = raw[..start].trim();
            return (id, (!event.is_empty()).then_some(event));
        }
    }
    (raw, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_namespace() {
        let id = Identifier::parse("Zombie").unwrap();
        assert_eq!(id.namespace(), "minecraft");
        assert_eq!(id.path(), "zombie");
        assert_eq!(id.to_string(), "minecraft:zombie");
    }

    #[test]
    fn explicit_namespace() {
        let id = Identifier::parse(" custom:guard ").unwrap();
        assert_eq!(id.to_string(), "custom:guard");
    }

    #[test]
    fn rejects_empty_parts() {
        assert!(Identifier::parse(":zombie").is_none());
        assert!(Identifier::parse("custom:").is_none());
        assert!(Identifier::parse("").is_none());
        assert!(Identifier::parse("a:b:c").is_none());
    }

    #[test]
    fn normalize_keeps_unparsable() {
        assert_eq!(normalize("husk"), "minecraft:husk");
        assert_eq!(normalize("a:b:c"), "a:b:c");
    }

    #[test]
    fn spawn_event_suffix() {
        assert_eq!(
            split_spawn_event("minecraft:zombie<minecraft:as_baby>"),
            ("minecraft:zombie", Some("minecraft:as_baby"))
        );
        assert_eq!(split_spawn_event("minecraft:drowned"), ("minecraft:drowned", None));
        assert_eq!(split_spawn_event("husk<>"), ("husk", None));
    }
}
