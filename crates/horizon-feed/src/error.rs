//! Error types for the feed crate.

use std::fmt;
use std::path::PathBuf;

/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;

/// Which identifier namespace a duplicate was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierScope {
    /// Section identifiers.
    Section,
    /// Item identifiers.
    Item,
}

impl fmt::Display for IdentifierScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section => f.write_str("section"),
            Self::Item => f.write_str("item"),
        }
    }
}

/// Errors that can occur while building, applying or presenting snapshots.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// A snapshot contains the same identifier twice.
    #[error("duplicate {scope} identifier in snapshot: {identifier}")]
    DuplicateIdentifier {
        scope: IdentifierScope,
        identifier: String,
    },

    /// A snapshot edit referenced a section that is not in the snapshot.
    #[error("section not found in snapshot: {identifier}")]
    SectionNotFound { identifier: String },

    /// A snapshot edit referenced an item that is not in the snapshot.
    #[error("item not found in snapshot: {identifier}")]
    ItemNotFound { identifier: String },

    /// Items were appended before any section was added.
    #[error("snapshot has no sections to append items to")]
    NoSections,

    /// An index path does not address an item of the displayed snapshot.
    #[error("index path {index_path} is out of bounds")]
    IndexOutOfBounds { index_path: String },

    /// A reuse pool was asked for a tag nobody registered.
    #[error("no factory registered for reuse tag '{tag}'")]
    UnregisteredReuseTag { tag: String },

    /// Configuration could not be parsed.
    #[error("invalid feed configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("failed to read configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FeedError {
    /// Create a duplicate-identifier error from any debuggable identifier.
    pub fn duplicate(scope: IdentifierScope, identifier: &impl fmt::Debug) -> Self {
        Self::DuplicateIdentifier {
            scope,
            identifier: format!("{identifier:?}"),
        }
    }

    /// Create a section-not-found error.
    pub fn section_not_found(identifier: &impl fmt::Debug) -> Self {
        Self::SectionNotFound {
            identifier: format!("{identifier:?}"),
        }
    }

    /// Create an item-not-found error.
    pub fn item_not_found(identifier: &impl fmt::Debug) -> Self {
        Self::ItemNotFound {
            identifier: format!("{identifier:?}"),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for the duplicate-identifier failure of `apply`.
    pub fn is_duplicate_identifier(&self) -> bool {
        matches!(self, Self::DuplicateIdentifier { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_names_identifier() {
        let err = FeedError::duplicate(IdentifierScope::Item, &"teal");
        assert!(err.is_duplicate_identifier());
        assert_eq!(
            err.to_string(),
            "duplicate item identifier in snapshot: \"teal\""
        );
    }

    #[test]
    fn test_not_found_messages() {
        assert_eq!(
            FeedError::section_not_found(&3).to_string(),
            "section not found in snapshot: 3"
        );
        assert_eq!(
            FeedError::item_not_found(&'x').to_string(),
            "item not found in snapshot: 'x'"
        );
        assert!(!FeedError::NoSections.is_duplicate_identifier());
    }
}
