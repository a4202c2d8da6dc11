/*!
`tree.rs`

Implements `cmdtree tree`: show the loaded command tree.

Human output is a boxed header plus one row per node, indented by depth:
  COMMAND | ALIASES | CONSOLE | PERMISSION

JSON Output Shape (recursive):
{
  "status": "ok",
  "source": "<file or null>",
  "count": 11,
  "root": {
    "name": "server",
    "aliases": [],
    "console": true,
    "permission": null,
    "children": [ ... ]
  }
}
*/

use anyhow::Result;
use clap::Args;
use serde_json::{Value, json};

use cmdtree::CommandNode;

use crate::cmd::format::{Role, StyleOptions, box_header, color, table};
use crate::cmd::shared::HostCaller;

/// CLI arguments for `cmdtree tree`
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Output JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Entry point for the tree subcommand.
pub fn execute_tree(
    args: TreeArgs,
    tree: &CommandNode<HostCaller>,
    source: Option<&str>,
) -> Result<()> {
    let count = count_nodes(tree);

    if args.json {
        println!(
            "{}",
            json!({
                "status": "ok",
                "source": source,
                "count": count,
                "root": node_json(tree),
            })
        );
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{}",
        box_header(
            format!("Commands ({count})"),
            Some(format!("source={}", source.unwrap_or("built-in sample"))),
            &style,
        )
    );

    let mut rows = Vec::with_capacity(count);
    collect_rows(tree, 0, &mut rows);
    println!(
        "{}",
        table(&["COMMAND", "ALIASES", "CONSOLE", "PERMISSION"], &rows, &style)
    );
    println!(
        "\n{}",
        color(
            Role::Dim,
            "Use `cmdtree complete \"<partial>\"` to preview completions for a caller",
            &style
        )
    );
    Ok(())
}

fn count_nodes(node: &CommandNode<HostCaller>) -> usize {
    1 + node.children().map(count_nodes).sum::<usize>()
}

fn collect_rows(node: &CommandNode<HostCaller>, depth: usize, rows: &mut Vec<Vec<String>>) {
    let aliases = node.aliases().collect::<Vec<_>>().join(", ");
    rows.push(vec![
        format!("{}{}", "  ".repeat(depth), node.name()),
        if aliases.is_empty() { "-".into() } else { aliases },
        (if node.allows_console() { "yes" } else { "no" }).to_string(),
        node.permission().unwrap_or("-").to_string(),
    ]);
    for child in node.children() {
        collect_rows(child, depth + 1, rows);
    }
}

fn node_json(node: &CommandNode<HostCaller>) -> Value {
    json!({
        "name": node.name(),
        "aliases": node.aliases().collect::<Vec<_>>(),
        "console": node.allows_console(),
        "permission": node.permission(),
        "children": node.children().map(node_json).collect::<Vec<_>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::shared::{build_tree, sample_tree_spec};

    fn sample() -> CommandNode<HostCaller> {
        build_tree(&sample_tree_spec().unwrap()).unwrap()
    }

    #[test]
    fn counts_every_node() {
        assert_eq!(count_nodes(&sample()), 11);
    }

    #[test]
    fn rows_are_indented_depth_first() {
        let mut rows = Vec::new();
        collect_rows(&sample(), 0, &mut rows);
        let names: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(
            names,
            vec![
                "server",
                "  heal",
                "  help",
                "  reload",
                "  town",
                "    admin",
                "      delete",
                "      reload",
                "    create",
                "    info",
                "    invite",
            ]
        );
        assert_eq!(rows[2][1], "?, h");
        assert_eq!(rows[4][3], "cmd.town");
    }

    #[test]
    fn json_is_recursive() {
        let v = node_json(&sample());
        assert_eq!(v["name"], "server");
        assert_eq!(v["children"][3]["name"], "town");
        assert_eq!(v["children"][3]["children"][0]["aliases"], json!(["a"]));
        assert_eq!(v["children"][0]["permission"], "cmd.heal");
    }
}
