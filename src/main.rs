use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod utils;

use cmd::{CompleteArgs, RunArgs, ShellArgs, TreeArgs};

/// cmdtree - drive a command dispatch tree from the terminal
///
/// Command layout:
///   cmdtree run      "<LINE>"  [--console] [-g KEY ...] [--json]
///   cmdtree complete "<LINE>"  [--console] [-g KEY ...] [--json]
///   cmdtree shell              [--console] [-g KEY ...] [--no-prompt]
///   cmdtree tree               [--json]
///
/// Global flags / env:
///   -v / -vv        Increase verbosity (debug / trace dispatch events)
///   -q / --quiet    Errors only
///   -f / --file     Command tree file (.yaml/.yml or .json); CMDTREE_FILE env fallback
///   CMDTREE_LOG     tracing filter directive, overrides -v / -q
///
/// Without a tree file the built-in sample tree is used.
///
/// Examples:
///   cmdtree run "town info" -g cmd.town
///   cmdtree run "town admin reload" --console -g '*'
///   cmdtree complete "town " -g cmd.town -g cmd.town.invite
///   cmdtree -f commands.yaml shell
#[derive(Parser, Debug)]
#[command(
    name = "cmdtree",
    version,
    author,
    about = "cmdtree - recursive command dispatch with permission-aware completion",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Command tree file (YAML or JSON)
    #[arg(short = 'f', long = "file", global = true, value_name = "TREE")]
    file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch one command line
    Run(RunArgs),

    /// List completion candidates for a partial line
    Complete(CompleteArgs),

    /// Read and dispatch lines from stdin
    Shell(ShellArgs),

    /// Show the loaded command tree
    Tree(TreeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    // Tree source: --file flag > CMDTREE_FILE env > built-in sample
    let source = cmd::shared::resolve_tree_source(cli.file.clone());

    let tree = match cmd::shared::load_tree(source.as_deref()) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("Failed to load command tree: {e:#}");
            std::process::exit(2);
        }
    };

    match cli.command {
        Commands::Run(args) => cmd::execute_run(args, &tree),
        Commands::Complete(args) => cmd::execute_complete(args, &tree),
        Commands::Shell(args) => cmd::execute_shell(args, &tree),
        Commands::Tree(args) => cmd::execute_tree(args, &tree, source.as_deref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_anywhere() {
        let cli = Cli::try_parse_from(["cmdtree", "run", "help", "-vv", "-f", "t.yaml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.file.as_deref(), Some("t.yaml"));
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn tree_subcommand_parses() {
        let cli = Cli::try_parse_from(["cmdtree", "-q", "tree", "--json"]).unwrap();
        assert!(cli.quiet);
        match cli.command {
            Commands::Tree(a) => assert!(a.json),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn subcommand_required() {
        assert!(Cli::try_parse_from(["cmdtree"]).is_err());
    }
}
