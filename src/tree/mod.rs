/*!
Command tree: nodes and the build phase that produces them.

  CommandBuilder  - mutable registration (spec, handler, children)
  CommandNode     - immutable result of `CommandBuilder::build`

Children are keyed by their lowercased name in a `BTreeMap`, so alias
fallback and completion listing walk siblings in sorted order.

Building validates every level: names and aliases must be single
non-empty tokens, and no alias may equal a sibling's name or alias.
Registering two children with the same name keeps the last one.
*/

pub mod spec;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::dispatch::{Caller, CommandHandler, NoopHandler};
use crate::error::TreeError;
use spec::{Messages, NodeSpec};

/* ---- Helpers ---- */

/// Drop the first token.
///
/// # Panics
///
/// Panics on an empty slice. The dispatcher only strips after a child has
/// consumed a token, so an empty slice here is a caller bug.
pub fn strip_first<T>(tokens: &[T]) -> &[T] {
    assert!(!tokens.is_empty(), "strip_first called with no tokens");
    &tokens[1..]
}

fn is_single_token(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}

/* ---- Node ---- */

/// A built command. Cheap to share: handlers sit behind `Arc`.
pub struct CommandNode<C: ?Sized> {
    name: String,
    aliases: BTreeSet<String>,
    allow_console: bool,
    permission: Option<String>,
    messages: Messages,
    handler: Arc<dyn CommandHandler<C>>,
    children: BTreeMap<String, CommandNode<C>>,
}

impl<C: ?Sized> CommandNode<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased aliases, sorted.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }

    pub fn allows_console(&self) -> bool {
        self.allow_console
    }

    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Usage text for handlers that want to report a wrong invocation.
    pub fn usage_message(&self) -> Option<&str> {
        self.messages.usage.as_deref()
    }

    pub(crate) fn handler(&self) -> &dyn CommandHandler<C> {
        self.handler.as_ref()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Children in sorted (lowercased name) order.
    pub fn children(&self) -> impl Iterator<Item = &CommandNode<C>> {
        self.children.values()
    }

    /// Children paired with their lookup key (the lowercased name).
    pub fn child_entries(&self) -> impl Iterator<Item = (&str, &CommandNode<C>)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Find the child a token refers to.
    ///
    /// The token is lowercased, then tried as a name; failing that, the
    /// first child (in sorted order) listing it as an alias wins.
    pub fn match_child(&self, token: &str) -> Option<&CommandNode<C>> {
        let key = token.to_lowercase();
        if let Some(child) = self.children.get(&key) {
            return Some(child);
        }
        self.children
            .values()
            .find(|child| child.aliases.contains(&key))
    }

    /// Follow a path of tokens through `match_child`, all of which must match.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&CommandNode<C>> {
        let mut node = self;
        for token in path {
            node = node.match_child(token.as_ref())?;
        }
        Some(node)
    }
}

impl<C: Caller + ?Sized> CommandNode<C> {
    /// Resolve `args` against this node and run whatever it lands on.
    pub fn dispatch(&self, caller: &C, args: &[String]) {
        crate::dispatch::dispatch(self, caller, args)
    }

    /// Completion candidates for the last token of `args`.
    pub fn complete(&self, caller: &C, args: &[String]) -> Vec<String> {
        crate::dispatch::complete(self, caller, args)
    }
}

impl<C: ?Sized> fmt::Debug for CommandNode<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("allow_console", &self.allow_console)
            .field("permission", &self.permission)
            .field("children", &self.children.values().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/* ---- Builder ---- */

/// Registration phase of a node. Consumed by [`CommandBuilder::build`].
pub struct CommandBuilder<C: ?Sized> {
    spec: NodeSpec,
    handler: Arc<dyn CommandHandler<C>>,
    children: BTreeMap<String, CommandBuilder<C>>,
}

impl<C: ?Sized> CommandBuilder<C> {
    /// A node with no behavior of its own (a pure group, until a handler is set).
    pub fn new(spec: NodeSpec) -> Self {
        Self {
            spec,
            handler: Arc::new(NoopHandler),
            children: BTreeMap::new(),
        }
    }

    pub fn with_handler(spec: NodeSpec, handler: impl CommandHandler<C> + 'static) -> Self {
        Self {
            spec,
            handler: Arc::new(handler),
            children: BTreeMap::new(),
        }
    }

    pub fn handler(mut self, handler: impl CommandHandler<C> + 'static) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    /// Share one handler between several nodes.
    pub fn shared_handler(mut self, handler: Arc<dyn CommandHandler<C>>) -> Self {
        self.handler = handler;
        self
    }

    pub fn spec(&self) -> &NodeSpec {
        &self.spec
    }

    /// Chaining form of [`CommandBuilder::register_child`].
    pub fn child(mut self, child: CommandBuilder<C>) -> Self {
        self.register_child(child);
        self
    }

    /// Insert `child` under its name, replacing any child already there.
    pub fn register_child(&mut self, child: CommandBuilder<C>) {
        let key = child.spec.name.to_lowercase();
        if let Some(previous) = self.children.insert(key, child) {
            warn!(
                parent = %self.spec.name,
                child = %previous.spec.name,
                "subcommand registered twice; keeping the last registration"
            );
        }
    }

    /// Validate and freeze the tree.
    pub fn build(self) -> Result<CommandNode<C>, TreeError> {
        let name = self.spec.name.clone();
        if !is_single_token(&name) {
            return Err(if name.trim().is_empty() {
                TreeError::EmptyName {
                    parent: String::new(),
                }
            } else {
                TreeError::InvalidName {
                    parent: String::new(),
                    name,
                }
            });
        }
        self.build_at(&name)
    }

    fn build_at(self, path: &str) -> Result<CommandNode<C>, TreeError> {
        validate_children(path, &self.children)?;

        let messages = self.spec.messages();
        let aliases = self
            .spec
            .aliases
            .iter()
            .map(|a| a.to_lowercase())
            .collect::<BTreeSet<_>>();

        let mut children = BTreeMap::new();
        for (key, child) in self.children {
            let child_path = format!("{path} {}", child.spec.name);
            children.insert(key, child.build_at(&child_path)?);
        }

        Ok(CommandNode {
            name: self.spec.name,
            aliases,
            allow_console: self.spec.allow_console,
            permission: self.spec.permission,
            messages,
            handler: self.handler,
            children,
        })
    }
}

/// Check one sibling group: token-shaped names/aliases, no alias clashes.
fn validate_children<C: ?Sized>(
    parent: &str,
    children: &BTreeMap<String, CommandBuilder<C>>,
) -> Result<(), TreeError> {
    // lowercased name or alias -> owning child's canonical name
    let mut claimed: BTreeMap<String, &str> = BTreeMap::new();

    for (key, child) in children {
        let name = child.spec.name.as_str();
        if name.trim().is_empty() {
            return Err(TreeError::EmptyName {
                parent: parent.to_string(),
            });
        }
        if !is_single_token(name) {
            return Err(TreeError::InvalidName {
                parent: parent.to_string(),
                name: name.to_string(),
            });
        }
        claimed.insert(key.clone(), name);
    }

    for child in children.values() {
        let name = child.spec.name.as_str();
        let own_key = name.to_lowercase();
        for alias in &child.spec.aliases {
            if !is_single_token(alias) {
                return Err(TreeError::InvalidAlias {
                    parent: parent.to_string(),
                    command: name.to_string(),
                    alias: alias.clone(),
                });
            }
            let alias_key = alias.to_lowercase();
            if alias_key == own_key {
                continue;
            }
            match claimed.get(&alias_key) {
                Some(other) if !other.eq_ignore_ascii_case(name) => {
                    return Err(TreeError::AliasCollision {
                        parent: parent.to_string(),
                        command: name.to_string(),
                        alias: alias.clone(),
                        other: (*other).to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    claimed.insert(alias_key, name);
                }
            }
        }
    }
    Ok(())
}

/* ---- Tests ---- */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{CallerContext, Invocation};

    struct Nobody;

    impl Caller for Nobody {
        fn context(&self) -> CallerContext {
            CallerContext::Interactive
        }
        fn has_permission(&self, _key: &str) -> bool {
            false
        }
        fn send_message(&self, _text: &str) {}
    }

    fn sample() -> CommandNode<Nobody> {
        CommandBuilder::new(NodeSpec::new("server"))
            .child(
                CommandBuilder::new(NodeSpec::new("Town").aliases(["T", "towns"]))
                    .child(CommandBuilder::new(NodeSpec::new("info").alias("i")))
                    .child(CommandBuilder::new(NodeSpec::new("invite"))),
            )
            .child(CommandBuilder::new(NodeSpec::new("help").alias("?")))
            .build()
            .unwrap()
    }

    #[test]
    fn strip_first_shrinks_to_empty() {
        let tokens = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut rest: &[String] = &tokens;
        let mut lens = Vec::new();
        while !rest.is_empty() {
            rest = strip_first(rest);
            lens.push(rest.len());
        }
        assert_eq!(lens, vec![2, 1, 0]);
        assert_eq!(tokens.len(), 3, "input untouched");

        let single = ["only"];
        assert!(strip_first(&single).is_empty());
    }

    #[test]
    #[should_panic(expected = "no tokens")]
    fn strip_first_rejects_empty() {
        let empty: [String; 0] = [];
        let _ = strip_first(&empty);
    }

    #[test]
    fn match_child_is_case_insensitive() {
        let root = sample();
        for token in ["TOWN", "town", "Town", "t", "T", "TOWNS"] {
            let found = root.match_child(token).map(CommandNode::name);
            assert_eq!(found, Some("Town"), "token {token}");
        }
        assert!(root.match_child("nope").is_none());
    }

    #[test]
    fn aliases_are_lowercased() {
        let root = sample();
        let town = root.match_child("town").unwrap();
        assert_eq!(town.aliases().collect::<Vec<_>>(), vec!["t", "towns"]);
    }

    #[test]
    fn find_walks_a_path() {
        let root = sample();
        assert_eq!(root.find(&["t", "I"]).map(CommandNode::name), Some("info"));
        assert!(root.find(&["t", "zzz"]).is_none());
        assert_eq!(root.find::<&str>(&[]).map(CommandNode::name), Some("server"));
    }

    #[test]
    fn children_iterate_sorted() {
        let root = sample();
        let names: Vec<_> = root.children().map(CommandNode::name).collect();
        assert_eq!(names, vec!["help", "Town"]);
    }

    #[test]
    fn duplicate_registration_keeps_last() {
        let root = CommandBuilder::<Nobody>::new(NodeSpec::new("root"))
            .child(CommandBuilder::new(NodeSpec::new("a").permission("first")))
            .child(CommandBuilder::new(NodeSpec::new("A").permission("second")))
            .build()
            .unwrap();
        assert_eq!(root.children().count(), 1);
        assert_eq!(root.match_child("a").unwrap().permission(), Some("second"));
    }

    #[test]
    fn alias_colliding_with_sibling_name_fails() {
        let err = CommandBuilder::<Nobody>::new(NodeSpec::new("root"))
            .child(CommandBuilder::new(NodeSpec::new("help")))
            .child(CommandBuilder::new(NodeSpec::new("heal").alias("HELP")))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            TreeError::AliasCollision {
                parent: "root".into(),
                command: "heal".into(),
                alias: "HELP".into(),
                other: "help".into(),
            }
        );
    }

    #[test]
    fn alias_shared_by_siblings_fails_deep() {
        let err = CommandBuilder::<Nobody>::new(NodeSpec::new("root"))
            .child(
                CommandBuilder::new(NodeSpec::new("town"))
                    .child(CommandBuilder::new(NodeSpec::new("info").alias("i")))
                    .child(CommandBuilder::new(NodeSpec::new("invite").alias("i"))),
            )
            .build()
            .unwrap_err();
        match err {
            TreeError::AliasCollision { parent, alias, .. } => {
                assert_eq!(parent, "root town");
                assert_eq!(alias, "i");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn alias_equal_to_own_name_is_fine() {
        let root = CommandBuilder::<Nobody>::new(NodeSpec::new("root"))
            .child(CommandBuilder::new(NodeSpec::new("help").alias("Help")))
            .build();
        assert!(root.is_ok());
    }

    #[test]
    fn names_must_be_single_tokens() {
        let err = CommandBuilder::<Nobody>::new(NodeSpec::new("root"))
            .child(CommandBuilder::new(NodeSpec::new("two words")))
            .build()
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidName { .. }));

        let err = CommandBuilder::<Nobody>::new(NodeSpec::new("  "))
            .build()
            .unwrap_err();
        assert!(matches!(err, TreeError::EmptyName { .. }));

        let err = CommandBuilder::<Nobody>::new(NodeSpec::new("root"))
            .child(CommandBuilder::new(NodeSpec::new("x").alias("")))
            .build()
            .unwrap_err();
        assert!(matches!(err, TreeError::InvalidAlias { .. }));
    }

    #[test]
    fn usage_message_is_exposed_to_handlers() {
        struct Usage;
        impl CommandHandler<Nobody> for Usage {
            fn execute(&self, inv: &Invocation<'_, Nobody>) {
                assert_eq!(inv.node.usage_message(), Some("&c[!] Wrong use of command./help"));
            }
        }
        let root = CommandBuilder::with_handler(NodeSpec::new("root"), Usage)
            .build()
            .unwrap();
        root.dispatch(&Nobody, &[]);
    }
}
