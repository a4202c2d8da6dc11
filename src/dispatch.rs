/*!
Dispatcher: resolution and completion over a [`CommandNode`] tree.

Resolution, per node:
  1. context check  - console caller on an interactive-only node: send
                      `no_console` (if any) and stop.
  2. resolve        - no children or no tokens: run here. Otherwise match
                      the first token; a hit recurses with the rest, a miss
                      runs here with the tokens untouched.
  3. authorize/run  - missing permission: send `no_permission` (if any) and
                      stop. Else `execute`, then exactly one of
                      `execute_interactive` / `execute_console`.

Completion follows the same path but never runs anything. Console callers
always get an empty list.

Nothing here returns an error. Unknown subcommands fall through to the
deepest reachable node, whose handler sees the leftover tokens.
*/

use tracing::{debug, trace};

use crate::tree::{CommandNode, strip_first};

/* ---- Host seams ---- */

/// Where a caller is issuing commands from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallerContext {
    /// A person at an interactive prompt (a player, a chat user).
    Interactive,
    /// A console, script or other non-interactive, restricted source.
    Console,
}

/// The entity issuing a command, as seen by the dispatcher.
pub trait Caller {
    fn context(&self) -> CallerContext;

    /// Whether the caller holds the permission named by `key`.
    fn has_permission(&self, key: &str) -> bool;

    /// Deliver already rendered text to the caller.
    fn send_message(&self, text: &str);

    fn is_console(&self) -> bool {
        self.context() == CallerContext::Console
    }
}

/// What a handler gets when its node is run.
pub struct Invocation<'a, C: ?Sized> {
    /// The node being run (for its name, usage message, children...).
    pub node: &'a CommandNode<C>,
    pub caller: &'a C,
    /// Tokens left after resolution. Unmatched subcommand names end up here.
    pub args: &'a [String],
}

impl<C: ?Sized> Invocation<'_, C> {
    /// First leftover token, if any.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

/// Behavior of a node. All three hooks default to doing nothing.
///
/// `execute` runs for every caller; afterwards exactly one of
/// `execute_interactive` or `execute_console` runs, picked by
/// [`Caller::context`].
pub trait CommandHandler<C: ?Sized>: Send + Sync {
    fn execute(&self, inv: &Invocation<'_, C>) {
        let _ = inv;
    }

    fn execute_interactive(&self, inv: &Invocation<'_, C>) {
        let _ = inv;
    }

    fn execute_console(&self, inv: &Invocation<'_, C>) {
        let _ = inv;
    }
}

/// Handler for grouping nodes that only exist to hold children.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl<C: ?Sized> CommandHandler<C> for NoopHandler {}

/// Wrap a closure as the context-agnostic `execute` hook.
pub struct FnHandler<F>(pub F);

impl<F> FnHandler<F> {
    pub fn new<C: ?Sized>(f: F) -> Self
    where
        F: Fn(&Invocation<'_, C>) + Send + Sync,
    {
        Self(f)
    }
}

impl<C, F> CommandHandler<C> for FnHandler<F>
where
    C: ?Sized,
    F: Fn(&Invocation<'_, C>) + Send + Sync,
{
    fn execute(&self, inv: &Invocation<'_, C>) {
        (self.0)(inv)
    }
}

/* ---- Resolution ---- */

/// Resolve `args` from `root` and run the node it lands on.
pub fn dispatch<C: Caller + ?Sized>(root: &CommandNode<C>, caller: &C, args: &[String]) {
    resolve(root, caller, args, 0);
}

fn resolve<C: Caller + ?Sized>(node: &CommandNode<C>, caller: &C, args: &[String], depth: usize) {
    if caller.is_console() && !node.allows_console() {
        debug!(command = node.name(), "console caller refused");
        if let Some(text) = node.messages().no_console.as_deref() {
            caller.send_message(text);
        }
        return;
    }

    if !node.has_children() || args.is_empty() {
        return run(node, caller, args);
    }

    match node.match_child(&args[0]) {
        Some(child) => {
            trace!(from = node.name(), to = child.name(), token = %args[0], "descending");
            resolve(child, caller, strip_first(args), depth + 1);
        }
        None => {
            // depth > 0 means an earlier token matched and this one did not.
            debug!(
                command = node.name(),
                token = %args[0],
                depth,
                "no subcommand matched; running current node"
            );
            run(node, caller, args);
        }
    }
}

fn run<C: Caller + ?Sized>(node: &CommandNode<C>, caller: &C, args: &[String]) {
    if let Some(key) = node.permission()
        && !caller.has_permission(key)
    {
        debug!(command = node.name(), permission = key, "permission denied");
        if let Some(text) = node.messages().no_permission.as_deref() {
            caller.send_message(text);
        }
        return;
    }

    trace!(command = node.name(), args = ?args, "executing");
    let inv = Invocation { node, caller, args };
    let handler = node.handler();
    handler.execute(&inv);
    match caller.context() {
        CallerContext::Interactive => handler.execute_interactive(&inv),
        CallerContext::Console => handler.execute_console(&inv),
    }
}

/* ---- Completion ---- */

/// Completion candidates for the final token of `args`.
///
/// Candidates come back in sorted order. Console callers get nothing.
pub fn complete<C: Caller + ?Sized>(
    root: &CommandNode<C>,
    caller: &C,
    args: &[String],
) -> Vec<String> {
    if caller.is_console() {
        return Vec::new();
    }
    complete_at(root, caller, args)
}

fn complete_at<C: Caller + ?Sized>(
    node: &CommandNode<C>,
    caller: &C,
    args: &[String],
) -> Vec<String> {
    if !node.has_children() || args.len() <= 1 {
        return leaf_completions(node, caller, args);
    }
    match node.match_child(&args[0]) {
        Some(child) => complete_at(child, caller, strip_first(args)),
        None => leaf_completions(node, caller, args),
    }
}

/// Names of `node`'s children usable by `caller` that start with the single
/// remaining token. Empty unless exactly one token remains.
pub fn leaf_completions<C: Caller + ?Sized>(
    node: &CommandNode<C>,
    caller: &C,
    args: &[String],
) -> Vec<String> {
    let [partial] = args else {
        return Vec::new();
    };
    let prefix = partial.to_lowercase();
    node.child_entries()
        .filter(|(_, child)| child.permission().is_none_or(|key| caller.has_permission(key)))
        .filter(|(key, _)| key.starts_with(&prefix))
        .map(|(_, child)| child.name().to_string())
        .collect()
}

/* ---- Tests ---- */
