/*!
`shell.rs`

Implements `cmdtree shell`: an interactive loop over stdin. Every line is
tokenized and dispatched against the loaded tree as one fixed caller
(chosen with `--console` / `--grant`), and the messages it sends back are
printed.

Meta commands (prefixed with `:` so they never shadow tree commands):
  :complete <partial>   list completion candidates for <partial>
  :whoami               show the caller context and grants
  :quit / :exit / :q    leave the shell

EOF or Ctrl-C also ends the session.
*/

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use cmdtree::CommandNode;

use crate::cmd::format::{Role, StyleOptions, box_header, color, render_codes};
use crate::cmd::run::context_label;
use crate::cmd::shared::{CallerArgs, HostCaller, tokenize_line, tokenize_partial};

/// CLI arguments for `cmdtree shell`
#[derive(Args, Debug, Default)]
pub struct ShellArgs {
    #[command(flatten)]
    pub caller: CallerArgs,

    /// Do not print a prompt or banner (for piped input)
    #[arg(long)]
    pub no_prompt: bool,
}

/// Outcome of one input line.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    /// Lines to print, then read the next input.
    Continue(Vec<String>),
    Exit,
}

/// Entry point for the shell subcommand.
pub fn execute_shell(args: ShellArgs, tree: &CommandNode<HostCaller>) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(shell_loop(args, tree))
}

async fn shell_loop(args: ShellArgs, tree: &CommandNode<HostCaller>) -> Result<()> {
    let caller = HostCaller::from_args(&args.caller);
    let style = StyleOptions::detect();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    if !args.no_prompt {
        let header = box_header(
            format!("cmdtree shell: {}", tree.name()),
            Some(format!(
                "{} caller • :complete <partial> • :quit",
                context_label(&caller)
            )),
            &style,
        );
        stdout.write_all(format!("{header}\n").as_bytes()).await?;
    }

    loop {
        if !args.no_prompt {
            let prompt = color(Role::Accent, format!("{}> ", tree.name()), &style);
            stdout.write_all(prompt.as_bytes()).await?;
            stdout.flush().await?;
        }

        let next = tokio::select! {
            line = lines.next_line() => line.context("failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                None
            }
        };
        let Some(line) = next else {
            break;
        };

        match handle_line(tree, &caller, &line, &style) {
            Step::Exit => break,
            Step::Continue(out) => {
                for l in out {
                    stdout.write_all(format!("{l}\n").as_bytes()).await?;
                }
                stdout.flush().await?;
            }
        }
    }
    Ok(())
}

fn handle_line(
    tree: &CommandNode<HostCaller>,
    caller: &HostCaller,
    line: &str,
    style: &StyleOptions,
) -> Step {
    let trimmed = line.trim_start();
    if trimmed.trim().is_empty() {
        return Step::Continue(Vec::new());
    }

    if let Some(meta) = trimmed.strip_prefix(':') {
        return handle_meta(tree, caller, meta, style);
    }

    match tokenize_line(trimmed) {
        Ok(tokens) => {
            tree.dispatch(caller, &tokens);
            Step::Continue(
                caller
                    .take_messages()
                    .iter()
                    .map(|m| render_codes(m, style))
                    .collect(),
            )
        }
        Err(e) => {
            warn!(error = %e, "unreadable input line");
            Step::Continue(vec![color(Role::Warning, format!("{e:#}"), style)])
        }
    }
}

fn handle_meta(
    tree: &CommandNode<HostCaller>,
    caller: &HostCaller,
    meta: &str,
    style: &StyleOptions,
) -> Step {
    let (name, rest) = meta.split_once(' ').unwrap_or((meta, ""));
    match name.trim_end() {
        "q" | "quit" | "exit" => Step::Exit,
        "whoami" => {
            let grants = caller.grants().collect::<Vec<_>>();
            let grants = if grants.is_empty() {
                "none".to_string()
            } else {
                grants.join(",")
            };
            Step::Continue(vec![format!(
                "context={} permissions={grants}",
                context_label(caller)
            )])
        }
        "complete" => match tokenize_partial(rest) {
            Ok(tokens) => {
                let candidates = tree.complete(caller, &tokens);
                if candidates.is_empty() {
                    Step::Continue(vec![color(Role::Dim, "(no completions)", style)])
                } else {
                    Step::Continue(vec![candidates.join("  ")])
                }
            }
            Err(e) => Step::Continue(vec![color(Role::Warning, format!("{e:#}"), style)]),
        },
        other => Step::Continue(vec![color(
            Role::Warning,
            format!("unknown shell command ':{other}'"),
            style,
        )]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::shared::{build_tree, sample_tree_spec};
    use cmdtree::CallerContext;

    fn setup(context: CallerContext, grants: &[&str]) -> (CommandNode<HostCaller>, HostCaller) {
        let tree = build_tree(&sample_tree_spec().unwrap()).unwrap();
        let caller = HostCaller::new(context, grants.iter().map(|s| s.to_string()));
        (tree, caller)
    }

    fn lines(step: Step) -> Vec<String> {
        match step {
            Step::Continue(out) => out,
            Step::Exit => panic!("unexpected exit"),
        }
    }

    #[test]
    fn dispatches_and_renders_plain() {
        let (tree, caller) = setup(CallerContext::Interactive, &["cmd.town"]);
        let out = lines(handle_line(&tree, &caller, "t i", &StyleOptions::plain()));
        assert_eq!(out, vec!["Town: Oakvale (12 residents)"]);
    }

    #[test]
    fn blank_lines_do_nothing() {
        let (tree, caller) = setup(CallerContext::Interactive, &[]);
        assert_eq!(
            handle_line(&tree, &caller, "   ", &StyleOptions::plain()),
            Step::Continue(vec![])
        );
    }

    #[test]
    fn meta_exit_variants() {
        let (tree, caller) = setup(CallerContext::Interactive, &[]);
        for l in [":q", ":quit", " :exit"] {
            assert_eq!(
                handle_line(&tree, &caller, l, &StyleOptions::plain()),
                Step::Exit,
                "{l}"
            );
        }
    }

    #[test]
    fn meta_complete_keeps_trailing_space() {
        let (tree, caller) = setup(CallerContext::Interactive, &["cmd.town"]);
        let out = lines(handle_line(
            &tree,
            &caller,
            ":complete town ",
            &StyleOptions::plain(),
        ));
        assert_eq!(out, vec!["info"]);

        let out = lines(handle_line(&tree, &caller, ":complete h", &StyleOptions::plain()));
        assert_eq!(out, vec!["help"]);
    }

    #[test]
    fn console_shell_gets_no_completions() {
        let (tree, caller) = setup(CallerContext::Console, &["*"]);
        let out = lines(handle_line(&tree, &caller, ":complete ", &StyleOptions::plain()));
        assert_eq!(out, vec!["(no completions)"]);
        let out = lines(handle_line(&tree, &caller, ":whoami", &StyleOptions::plain()));
        assert_eq!(out, vec!["context=console permissions=*"]);
    }

    #[test]
    fn bad_quoting_is_reported_not_fatal() {
        let (tree, caller) = setup(CallerContext::Interactive, &[]);
        let out = lines(handle_line(&tree, &caller, "help \"open", &StyleOptions::plain()));
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("failed to tokenize"));
    }

    #[test]
    fn unknown_meta_command() {
        let (tree, caller) = setup(CallerContext::Interactive, &[]);
        let out = lines(handle_line(&tree, &caller, ":bogus", &StyleOptions::plain()));
        assert!(out[0].contains(":bogus"));
    }
}
