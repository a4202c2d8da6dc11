//! cmdtree: a recursive command dispatch tree.
//!
//! A root [`CommandNode`] owns named subcommands (each reachable through
//! case-insensitive aliases). [`dispatch`] walks the tree by consuming
//! leading tokens and runs the deepest matching node; [`complete`] walks the
//! same path and returns name candidates for the last, partially typed token.
//!
//! Key items:
//!   NodeSpec / CommandBuilder  -> declarative construction, validated build
//!   CommandNode                -> immutable tree, safe to share across threads
//!   Caller / CommandHandler    -> host seams (context, permissions, messages, behavior)
//!
//! ```
//! use cmdtree::{CallerContext, Caller, CommandBuilder, NodeSpec};
//!
//! struct Console;
//! impl Caller for Console {
//!     fn context(&self) -> CallerContext { CallerContext::Console }
//!     fn has_permission(&self, _key: &str) -> bool { true }
//!     fn send_message(&self, text: &str) { println!("{text}"); }
//! }
//!
//! let root = CommandBuilder::<Console>::new(NodeSpec::new("server").console(true))
//!     .child(CommandBuilder::new(NodeSpec::new("reload").console(true)))
//!     .build()
//!     .unwrap();
//! root.dispatch(&Console, &["reload".to_string()]);
//! ```

pub mod dispatch;
pub mod error;
pub mod tree;

pub use dispatch::{
    Caller, CallerContext, CommandHandler, FnHandler, Invocation, NoopHandler, complete, dispatch,
    leaf_completions,
};
pub use error::TreeError;
pub use tree::spec::{Messages, NodeSpec};
pub use tree::{CommandBuilder, CommandNode, strip_first};
