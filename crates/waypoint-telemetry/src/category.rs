//! Tagged log events.
//!
//! Waypoint tags each diagnostic with a category: the three built-in ones
//! map onto tracing levels, custom tags (`SWAGGER`, `HTTP`) log at info.
//! The tag travels in the `category` field.

use std::fmt;

use tracing::{error, info, warn};

/// Category of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Informational message.
    Message,
    /// Something unexpected that did not stop the operation.
    Warning,
    /// A failed operation.
    Error,
    /// A subsystem tag.
    Tagged(&'static str),
}

impl Category {
    /// The tag written in the `category` field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "MESSAGE",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Tagged(tag) => *tag,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emits `message` under `category`.
pub fn log(category: Category, message: impl fmt::Display) {
    let tag = category.as_str();
    match category {
        Category::Warning => warn!(category = tag, "{message}"),
        Category::Error => error!(category = tag, "{message}"),
        Category::Message | Category::Tagged(_) => info!(category = tag, "{message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tags() {
        assert_eq!(Category::Message.as_str(), "MESSAGE");
        assert_eq!(Category::Warning.to_string(), "WARNING");
        assert_eq!(Category::Error.as_str(), "ERROR");
        assert_eq!(Category::Tagged("SWAGGER").to_string(), "SWAGGER");
    }

    #[test]
    fn test_log_without_subscriber() {
        log(Category::Tagged("HTTP"), "nothing listens");
        log(Category::Error, format_args!("{} failed", "bind"));
    }
}
