//! Construction-time errors.
//!
//! Dispatch and completion never fail; only building a tree can.

use thiserror::Error;

/// Problems found while turning a [`crate::CommandBuilder`] into a tree.
///
/// `parent` is the space separated path of the node whose children were
/// being validated (the root's own name for top-level commands).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    /// A command was declared with an empty (or all-whitespace) name.
    #[error("empty command name under '{parent}'")]
    EmptyName { parent: String },

    /// Names are matched against single whitespace-separated tokens, so a
    /// name containing whitespace could never be reached.
    #[error("command name '{name}' under '{parent}' contains whitespace")]
    InvalidName { parent: String, name: String },

    /// An alias contains whitespace or is empty.
    #[error("alias '{alias}' of '{command}' under '{parent}' is not a single token")]
    InvalidAlias {
        parent: String,
        command: String,
        alias: String,
    },

    /// An alias of one child equals the name or an alias of a sibling.
    #[error("alias '{alias}' of '{command}' under '{parent}' collides with sibling '{other}'")]
    AliasCollision {
        parent: String,
        command: String,
        alias: String,
        other: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_path() {
        let err = TreeError::AliasCollision {
            parent: "server town".into(),
            command: "info".into(),
            alias: "i".into(),
            other: "invite".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("server town"));
        assert!(msg.contains("'i'"));
        assert!(msg.contains("invite"));
    }
}
