/*!
shared.rs - shared helpers for subcommands.

Focus:
  - TreeSpec: file format for declaring a command tree (YAML or JSON)
  - load_tree / build_tree: file (or built-in sample) -> CommandNode
  - HostCaller + CallerArgs: the caller simulated from CLI flags
  - ReplyHandler: demo behavior attached to every declared node
  - tokenize_line / tokenize_partial: shell-style splitting of input lines

Tree source precedence: --file flag > CMDTREE_FILE env > built-in sample.
*/

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use cmdtree::{Caller, CallerContext, CommandBuilder, CommandHandler, CommandNode, Invocation, NodeSpec};

use crate::cmd::format::{StyleOptions, render_codes};

/// Environment fallback for `--file`.
pub const TREE_ENV: &str = "CMDTREE_FILE";

/// Permission grant that matches every key.
pub const GRANT_ALL: &str = "*";

/* ---- Tree File ---- */

/// One node of a tree file: the node spec plus demo replies and children.
///
/// ```yaml
/// name: town
/// aliases: [t]
/// permission: cmd.town
/// reply: "&aTown commands: info, create"
/// children:
///   - name: info
///     reply: "&7Town info"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSpec {
    #[serde(flatten)]
    pub node: NodeSpec,

    /// Sent to every caller when this node runs.
    #[serde(default)]
    pub reply: Option<String>,

    /// Sent only to interactive callers.
    #[serde(default)]
    pub interactive_reply: Option<String>,

    /// Sent only to console callers.
    #[serde(default)]
    pub console_reply: Option<String>,

    #[serde(default)]
    pub children: Vec<TreeSpec>,
}

const SAMPLE_TREE: &str = r#"
name: server
console: true
reply: "&7Commands: help, heal, town, reload"
children:
  - name: help
    aliases: ["?", h]
    console: true
    reply: "&eTry: town info, town admin reload, heal"
  - name: heal
    permission: cmd.heal
    interactive_reply: "&aYou have been healed."
  - name: town
    aliases: [t]
    permission: cmd.town
    usage: " /town <info|create|invite|admin>"
    children:
      - name: info
        aliases: [i]
        reply: "&7Town: Oakvale (12 residents)"
      - name: create
        permission: cmd.town.create
        usage: " /town create <name>"
      - name: invite
        permission: cmd.town.invite
        usage: " /town invite <player>"
      - name: admin
        aliases: [a]
        console: true
        permission: cmd.town.admin
        children:
          - name: reload
            console: true
            console_reply: "Town data reloaded."
            interactive_reply: "&aTown data reloaded."
          - name: delete
            console: true
            permission: cmd.town.admin.delete
            usage: " /town admin delete <town>"
  - name: reload
    console: true
    permission: cmd.reload
    reply: "&aConfiguration reloaded."
"#;

/// The tree used when no file is configured.
pub fn sample_tree_spec() -> Result<TreeSpec> {
    serde_yaml::from_str(SAMPLE_TREE).context("built-in sample tree is invalid")
}

/// Read a tree file. `.yaml` / `.yml` parse as YAML, anything else as JSON.
pub fn load_tree_spec(path: &str) -> Result<TreeSpec> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tree file: {path}"))?;
    let lower = path.to_ascii_lowercase();

    if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        serde_yaml::from_str(&raw).with_context(|| format!("failed to parse YAML tree file: {path}"))
    } else {
        serde_json::from_str(&raw).with_context(|| format!("failed to parse JSON tree file: {path}"))
    }
}

/// Pick the tree file (flag > env) and describe where it came from.
pub fn resolve_tree_source(file: Option<String>) -> Option<String> {
    file.or_else(|| {
        std::env::var(TREE_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
    })
}

/// Load and build the tree from `file`, or the built-in sample when `None`.
pub fn load_tree(file: Option<&str>) -> Result<CommandNode<HostCaller>> {
    let spec = match file {
        Some(path) => {
            if !Path::new(path).exists() {
                anyhow::bail!("tree file does not exist: {path}");
            }
            load_tree_spec(path)?
        }
        None => sample_tree_spec()?,
    };
    let tree = build_tree(&spec).context("invalid command tree")?;
    debug!(root = tree.name(), source = file.unwrap_or("<sample>"), "command tree loaded");
    Ok(tree)
}

/// Turn a `TreeSpec` into a validated tree with a `ReplyHandler` on every node.
pub fn build_tree(spec: &TreeSpec) -> Result<CommandNode<HostCaller>> {
    Ok(builder_for(spec, "").build()?)
}

fn builder_for(spec: &TreeSpec, parent_path: &str) -> CommandBuilder<HostCaller> {
    let path = if parent_path.is_empty() {
        spec.node.name.clone()
    } else {
        format!("{parent_path} {}", spec.node.name)
    };
    let handler = ReplyHandler {
        path: path.clone(),
        reply: spec.reply.clone(),
        interactive_reply: spec.interactive_reply.clone(),
        console_reply: spec.console_reply.clone(),
    };
    let mut builder = CommandBuilder::with_handler(spec.node.clone(), handler);
    for child in &spec.children {
        builder.register_child(builder_for(child, &path));
    }
    builder
}

/* ---- Caller ---- */

/// Caller flags shared by `run`, `complete` and `shell`.
#[derive(Args, Debug, Clone, Default)]
pub struct CallerArgs {
    /// Act as a console (restricted, non-interactive) caller
    #[arg(long)]
    pub console: bool,

    /// Grant a permission key (repeatable; "*" grants everything)
    #[arg(short = 'g', long = "grant", value_name = "KEY")]
    pub grants: Vec<String>,
}

/// Caller built from CLI flags. Messages are collected, not printed, so
/// each subcommand decides how to render them.
#[derive(Debug)]
pub struct HostCaller {
    context: CallerContext,
    grants: BTreeSet<String>,
    outbox: RefCell<Vec<String>>,
}

impl HostCaller {
    pub fn new(context: CallerContext, grants: impl IntoIterator<Item = String>) -> Self {
        Self {
            context,
            grants: grants.into_iter().collect(),
            outbox: RefCell::new(Vec::new()),
        }
    }

    pub fn from_args(args: &CallerArgs) -> Self {
        let context = if args.console {
            CallerContext::Console
        } else {
            CallerContext::Interactive
        };
        Self::new(context, args.grants.iter().cloned())
    }

    /// Granted permission keys, sorted.
    pub fn grants(&self) -> impl Iterator<Item = &str> {
        self.grants.iter().map(String::as_str)
    }

    /// Drain messages sent since the last call.
    pub fn take_messages(&self) -> Vec<String> {
        std::mem::take(&mut *self.outbox.borrow_mut())
    }
}

impl Caller for HostCaller {
    fn context(&self) -> CallerContext {
        self.context
    }

    fn has_permission(&self, key: &str) -> bool {
        self.grants.contains(GRANT_ALL) || self.grants.contains(key)
    }

    fn send_message(&self, text: &str) {
        self.outbox.borrow_mut().push(text.to_string());
    }
}

/// Print collected messages through the color-code renderer.
pub fn print_messages(messages: &[String], style: &StyleOptions) {
    for m in messages {
        println!("{}", render_codes(m, style));
    }
}

/* ---- Demo Handler ---- */

/// Sends the configured replies. A node without a general reply that was
/// handed leftover arguments answers with its usage message instead.
#[derive(Debug, Clone)]
pub struct ReplyHandler {
    path: String,
    reply: Option<String>,
    interactive_reply: Option<String>,
    console_reply: Option<String>,
}

impl CommandHandler<HostCaller> for ReplyHandler {
    fn execute(&self, inv: &Invocation<'_, HostCaller>) {
        info!(command = %self.path, args = ?inv.args, "command executed");
        match (&self.reply, inv.args.is_empty()) {
            (Some(text), _) => inv.caller.send_message(text),
            (None, false) => {
                if let Some(usage) = inv.node.usage_message() {
                    inv.caller.send_message(usage);
                }
            }
            (None, true) => {}
        }
    }

    fn execute_interactive(&self, inv: &Invocation<'_, HostCaller>) {
        if let Some(text) = &self.interactive_reply {
            inv.caller.send_message(text);
        }
    }

    fn execute_console(&self, inv: &Invocation<'_, HostCaller>) {
        if let Some(text) = &self.console_reply {
            inv.caller.send_message(text);
        }
    }
}

/* ---- Tokenizing ---- */

/// Split a full command line with shell rules (quotes, escapes).
pub fn tokenize_line(line: &str) -> Result<Vec<String>> {
    shell_words::split(line).with_context(|| format!("failed to tokenize input: {line}"))
}

/// Split a line being completed. A trailing space (or an empty line) means
/// the user is starting a new token, so an empty token is appended.
pub fn tokenize_partial(line: &str) -> Result<Vec<String>> {
    let mut tokens = tokenize_line(line)?;
    if line.is_empty() || line.ends_with(char::is_whitespace) {
        tokens.push(String::new());
    }
    Ok(tokens)
}

/* ---- Tests ---- */
