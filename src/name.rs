//! Hierarchical logger names.
//!
//! A logger name is a dot-separated path, `"my.subsystem.worker"`. The empty
//! name is reserved for the root logger, which every other logger inherits
//! from. In configuration documents the root entry is spelled `"root"`.

use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoggerName {
    components: Vec<String>,
}

impl LoggerName {
    /// The root name: zero components.
    pub fn root() -> LoggerName {
        LoggerName { components: Vec::new() }
    }

    /// Parse a dot-separated name. Empty components are skipped, so
    /// `"a..b"` and `"a.b"` are the same name and `""` is the root.
    pub fn new(name: &str) -> LoggerName {
        LoggerName {
            components: name
                .split('.')
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Map a configuration document key to a name: `"root"` is the root
    /// entry, anything else is an ordinary dotted name.
    pub fn from_config_key(key: &str) -> LoggerName {
        if key == "root" {
            LoggerName::root()
        } else {
            LoggerName::new(key)
        }
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// First `len` components of this name; `prefix(0)` is the root.
    pub fn prefix(&self, len: usize) -> LoggerName {
        assert!(len <= self.components.len(), "prefix length out of range");
        LoggerName {
            components: self.components[..len].to_vec(),
        }
    }
}

impl fmt::Display for LoggerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.components.join("."))
    }
}

impl From<&str> for LoggerName {
    fn from(name: &str) -> Self {
        LoggerName::new(name)
    }
}

impl From<String> for LoggerName {
    fn from(name: String) -> Self {
        LoggerName::new(&name)
    }
}

impl PartialOrd for LoggerName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LoggerName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let n = LoggerName::new("my.test.logger");
        assert_eq!(n.len(), 3);
        assert_eq!(n.to_string(), "my.test.logger");
    }

    #[test]
    fn empty_components_skipped() {
        assert_eq!(LoggerName::new("a..b"), LoggerName::new("a.b"));
        assert_eq!(LoggerName::new(".a."), LoggerName::new("a"));
        assert!(LoggerName::new("").is_root());
    }

    #[test]
    fn prefixes() {
        let n = LoggerName::new("a.b.c");
        assert!(n.prefix(0).is_root());
        assert_eq!(n.prefix(1), LoggerName::new("a"));
        assert_eq!(n.prefix(2), LoggerName::new("a.b"));
        assert_eq!(n.prefix(3), n);
    }

    #[test]
    #[should_panic(expected = "prefix length out of range")]
    fn prefix_out_of_range_panics() {
        LoggerName::new("a.b").prefix(3);
    }

    #[test]
    fn config_key_mapping() {
        assert!(LoggerName::from_config_key("root").is_root());
        assert_eq!(
            LoggerName::from_config_key("my.logger"),
            LoggerName::new("my.logger")
        );
    }

    #[test]
    fn ordering_is_component_wise() {
        assert!(LoggerName::new("a") < LoggerName::new("a.b"));
        assert!(LoggerName::new("a.b") < LoggerName::new("b"));
        assert!(LoggerName::root() < LoggerName::new("a"));
    }
}
