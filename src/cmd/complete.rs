/*!
`complete.rs`

Implements `cmdtree complete <LINE>`: print completion candidates for a
partially typed line, one per line (or as JSON).

A trailing space asks for the next token: `"town "` lists town's
subcommands, `"town in"` lists those starting with `in`. Console callers
never receive candidates.

JSON Output Shape:
{
  "status": "ok",
  "input": "town in",
  "context": "interactive",
  "count": 2,
  "candidates": ["info", "invite"]
}
*/

use anyhow::Result;
use clap::Args;

use cmdtree::CommandNode;

use crate::cmd::format::{Role, StyleOptions, color};
use crate::cmd::run::context_label;
use crate::cmd::shared::{CallerArgs, HostCaller, tokenize_partial};

/// CLI arguments for `cmdtree complete <LINE>`
#[derive(Args, Debug)]
pub struct CompleteArgs {
    /// Partial command line (may be empty)
    #[arg(value_name = "LINE", default_value = "")]
    pub line: String,

    #[command(flatten)]
    pub caller: CallerArgs,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

/// Entry point for the complete subcommand.
pub fn execute_complete(args: CompleteArgs, tree: &CommandNode<HostCaller>) -> Result<()> {
    let tokens = tokenize_partial(&args.line)?;
    let caller = HostCaller::from_args(&args.caller);
    let candidates = tree.complete(&caller, &tokens);

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "input": args.line,
                "context": context_label(&caller),
                "count": candidates.len(),
                "candidates": candidates,
            })
        );
        return Ok(());
    }

    if candidates.is_empty() {
        let style = StyleOptions::detect();
        eprintln!("{}", color(Role::Dim, "(no completions)", &style));
    }
    for c in candidates {
        println!("{c}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Complete(CompleteArgs),
    }

    #[test]
    fn line_defaults_to_empty() {
        let cli = TestCli::try_parse_from(["t", "complete"]).unwrap();
        match cli.cmd {
            TestSub::Complete(a) => {
                assert_eq!(a.line, "");
                assert!(!a.caller.console);
            }
        }
    }

    #[test]
    fn json_flag() {
        let cli = TestCli::try_parse_from(["t", "complete", "town ", "--json"]).unwrap();
        match cli.cmd {
            TestSub::Complete(a) => {
                assert_eq!(a.line, "town ");
                assert!(a.json);
            }
        }
    }
}
