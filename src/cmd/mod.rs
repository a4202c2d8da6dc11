/*!
CLI subcommands of the `cmdtree` binary.

Each subcommand module exposes one public `execute_*` function returning
`anyhow::Result<()>` and takes the already loaded command tree.

  run.rs       dispatch one line
  complete.rs  completion candidates for a partial line
  shell.rs     interactive loop over stdin
  tree.rs      show the loaded tree
  shared.rs    tree loading, host caller, demo handler, tokenizing
  format.rs    human output (colors, `&` codes, boxes, tables)
*/

pub mod complete;
pub mod format;
pub mod run;
pub mod shared;
pub mod shell;
pub mod tree;

pub use complete::{CompleteArgs, execute_complete};
pub use run::{RunArgs, execute_run};
pub use shell::{ShellArgs, execute_shell};
pub use tree::{TreeArgs, execute_tree};
