//! Registry of known deep-link URL patterns.
//!
//! Users often paste a link to a work item into the search box. The search
//! endpoint recognizes such links by matching the query text against the URL
//! patterns registered here and then looks the item up directly instead of
//! running a text search.
//!
//! A pattern is registered the first time a request arrives through a new
//! host and read on every search, so the registry is shared between request
//! handlers and guarded by a reader/writer lock. It is created by the caller
//! and passed in explicitly; there is no process-wide instance.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use regex::Regex;
use thiserror::Error;

/// Capture group holding the work item number in work item link patterns.
pub const NUMBER_CAPTURE: &str = "number";

/// Capture group holding the space segment in work item link patterns.
pub const SPACE_CAPTURE: &str = "space";

/// Errors that can occur while registering URL patterns.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The pattern is not a valid regular expression.
    #[error("invalid URL pattern for '{name}': {message}")]
    InvalidPattern {
        /// The name the pattern was registered under.
        name: String,
        /// The regex compiler's description of the problem.
        message: String,
    },

    /// The host name is empty.
    #[error("host name is empty")]
    EmptyHost,
}

/// A registered URL pattern.
#[derive(Debug, Clone)]
pub struct KnownUrl {
    /// The name the pattern was registered under.
    pub name: String,
    /// The compiled pattern.
    pub pattern: Regex,
}

/// A successful match of text against a registered pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatch {
    /// The name of the matching pattern.
    pub name: String,
    /// The named capture groups that participated in the match.
    pub captures: BTreeMap<String, String>,
}

impl UrlMatch {
    /// Returns the value of a named capture group.
    pub fn capture(&self, group: &str) -> Option<&str> {
        self.captures.get(group).map(String::as_str)
    }
}

/// Thread-safe map from logical names to URL patterns.
#[derive(Debug, Default)]
pub struct HostRegistry {
    patterns: RwLock<HashMap<String, KnownUrl>>,
}

impl HostRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the map half-updated, so a
    // poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, KnownUrl>> {
        self.patterns.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, KnownUrl>> {
        self.patterns.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `pattern` under `name`, replacing any previous pattern.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidPattern` if `pattern` does not compile.
    pub fn register(&self, name: impl Into<String>, pattern: &str) -> Result<(), RegistryError> {
        let name = name.into();
        let known = compile(&name, pattern)?;
        tracing::debug!(%name, pattern, "registering known URL pattern");
        self.write().insert(name, known);
        Ok(())
    }

    /// Registers `pattern` under `name` unless the name is already taken.
    ///
    /// Returns true if the pattern was added.
    pub fn register_if_absent(
        &self,
        name: impl Into<String>,
        pattern: &str,
    ) -> Result<bool, RegistryError> {
        let name = name.into();
        if self.read().contains_key(&name) {
            return Ok(false);
        }

        let known = compile(&name, pattern)?;
        let mut patterns = self.write();
        // Another writer may have won the race since the read check.
        if patterns.contains_key(&name) {
            return Ok(false);
        }
        tracing::debug!(%name, pattern, "registering known URL pattern");
        patterns.insert(name, known);
        Ok(true)
    }

    /// Registers the work item deep-link pattern of `host`:
    /// `[http[s]://]<host>/<space>/plan/detail/<number>`.
    ///
    /// Returns true if the host was not known before.
    pub fn register_work_item_host(&self, host: &str) -> Result<bool, RegistryError> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(RegistryError::EmptyHost);
        }
        let pattern = format!(
            r"^(?:https?://)?{}/(?P<{SPACE_CAPTURE}>[^/\s]+)/plan/detail/(?P<{NUMBER_CAPTURE}>\d+)/?$",
            regex::escape(host)
        );
        self.register_if_absent(work_item_pattern_name(host), &pattern)
    }

    /// Returns the pattern registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<KnownUrl> {
        self.read().get(name).cloned()
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered patterns.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Matches `text` against every registered pattern.
    ///
    /// When several patterns match, the one with the smallest name wins so
    /// that the outcome does not depend on map iteration order.
    pub fn match_url(&self, text: &str) -> Option<UrlMatch> {
        let text = text.trim();
        let patterns = self.read();
        let mut candidates: Vec<&KnownUrl> = patterns.values().collect();
        candidates.sort_by(|a, b| a.name.cmp(&b.name));

        candidates.into_iter().find_map(|known| {
            let caps = known.pattern.captures(text)?;
            let captures = known
                .pattern
                .capture_names()
                .flatten()
                .filter_map(|group| {
                    caps.name(group)
                        .map(|m| (group.to_string(), m.as_str().to_string()))
                })
                .collect();
            Some(UrlMatch {
                name: known.name.clone(),
                captures,
            })
        })
    }
}

/// Name under which the work item link pattern of `host` is registered.
pub fn work_item_pattern_name(host: &str) -> String {
    format!("{host}/work-item")
}

fn compile(name: &str, pattern: &str) -> Result<KnownUrl, RegistryError> {
    let pattern = Regex::new(pattern).map_err(|e| RegistryError::InvalidPattern {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    Ok(KnownUrl {
        name: name.to_string(),
        pattern,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_register_and_lookup() {
        let registry = HostRegistry::new();
        registry.register("docs", r"^https://docs\.example\.com/").unwrap();

        let known = registry.lookup("docs").unwrap();
        assert_eq!(known.name, "docs");
        assert!(known.pattern.is_match("https://docs.example.com/page"));
        assert!(registry.lookup("missing").is_none());
    }

    #[test]
    fn test_register_replaces_existing() {
        let registry = HostRegistry::new();
        registry.register("a", "^one$").unwrap();
        registry.register("a", "^two$").unwrap();
        assert!(registry.lookup("a").unwrap().pattern.is_match("two"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_pattern() {
        let registry = HostRegistry::new();
        let err = registry.register("bad", "(unclosed").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidPattern { ref name, .. } if name == "bad"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_if_absent_keeps_first() {
        let registry = HostRegistry::new();
        assert!(registry.register_if_absent("a", "^one$").unwrap());
        assert!(!registry.register_if_absent("a", "^two$").unwrap());
        assert!(registry.lookup("a").unwrap().pattern.is_match("one"));
    }

    #[test]
    fn test_work_item_host_matching() {
        let registry = HostRegistry::new();
        assert!(registry.register_work_item_host("tracker.example.io").unwrap());
        assert!(!registry.register_work_item_host("tracker.example.io/").unwrap());

        let m = registry
            .match_url("https://tracker.example.io/platform/plan/detail/42")
            .unwrap();
        assert_eq!(m.name, "tracker.example.io/work-item");
        assert_eq!(m.capture(NUMBER_CAPTURE), Some("42"));
        assert_eq!(m.capture(SPACE_CAPTURE), Some("platform"));

        assert!(registry
            .match_url("tracker.example.io/platform/plan/detail/7")
            .is_some());
        assert!(registry
            .match_url("https://trackerXexample.io/platform/plan/detail/42")
            .is_none());
        assert!(registry.match_url("login page crash").is_none());
    }

    #[test]
    fn test_empty_host_rejected() {
        let registry = HostRegistry::new();
        assert_eq!(
            registry.register_work_item_host("  "),
            Err(RegistryError::EmptyHost)
        );
    }

    #[test]
    fn test_names_sorted() {
        let registry = HostRegistry::new();
        registry.register("b", "b").unwrap();
        registry.register("a", "a").unwrap();
        assert_eq!(registry.names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_concurrent_registration_and_matching() {
        let registry = Arc::new(HostRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let host = format!("host{}.example.io", i % 4);
                    registry.register_work_item_host(&host).unwrap();
                    for _ in 0..50 {
                        let url = format!("https://{host}/s/plan/detail/{i}");
                        assert!(registry.match_url(&url).is_some());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 4);
    }
}
