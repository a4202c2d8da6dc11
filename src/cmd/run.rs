/*!
`run.rs`

Implements `cmdtree run <LINE>`: tokenize one line, dispatch it against the
loaded tree as the caller described by `--console` / `--grant`, then print
whatever the command sent back.

JSON Output Shape:
{
  "status": "ok",
  "input": "town info",
  "tokens": ["town", "info"],
  "context": "interactive",
  "messages": ["&7Town: Oakvale (12 residents)"]
}

Messages are raw in JSON (color codes intact) and rendered in human output.
*/

use anyhow::Result;
use clap::Args;

use cmdtree::{Caller, CommandNode};

use crate::cmd::format::StyleOptions;
use crate::cmd::shared::{CallerArgs, HostCaller, print_messages, tokenize_line};

/// CLI arguments for `cmdtree run <LINE>`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Command line to dispatch (quote it to keep it one argument)
    #[arg(value_name = "LINE")]
    pub line: String,

    #[command(flatten)]
    pub caller: CallerArgs,

    /// Output JSON instead of rendered messages
    #[arg(long)]
    pub json: bool,
}

/// Entry point for the run subcommand.
pub fn execute_run(args: RunArgs, tree: &CommandNode<HostCaller>) -> Result<()> {
    let tokens = tokenize_line(&args.line)?;
    let caller = HostCaller::from_args(&args.caller);

    tree.dispatch(&caller, &tokens);
    let messages = caller.take_messages();

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "status": "ok",
                "input": args.line,
                "tokens": tokens,
                "context": context_label(&caller),
                "messages": messages,
            })
        );
    } else {
        print_messages(&messages, &StyleOptions::detect());
    }
    Ok(())
}

pub(crate) fn context_label(caller: &HostCaller) -> &'static str {
    if caller.is_console() {
        "console"
    } else {
        "interactive"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    // Ad-hoc parser just for testing RunArgs in isolation.
    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Run(RunArgs),
    }

    #[test]
    fn clap_parses_run_with_grants() {
        let cli = TestCli::try_parse_from([
            "t", "run", "town info", "--grant", "cmd.town", "-g", "cmd.heal", "--console",
        ])
        .unwrap();
        match cli.cmd {
            TestSub::Run(a) => {
                assert_eq!(a.line, "town info");
                assert_eq!(a.caller.grants, vec!["cmd.town", "cmd.heal"]);
                assert!(a.caller.console);
                assert!(!a.json);
            }
        }
    }

    #[test]
    fn context_labels() {
        let args = CallerArgs {
            console: true,
            grants: vec![],
        };
        assert_eq!(context_label(&HostCaller::from_args(&args)), "console");
        assert_eq!(
            context_label(&HostCaller::from_args(&CallerArgs::default())),
            "interactive"
        );
    }
}
