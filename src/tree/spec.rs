/*!
Declarative node specification.

`NodeSpec` is the construction input for a single command: its name,
aliases, console flag, permission key and the caller-facing messages.
Every message is optional; a `None` message means "say nothing".

Defaults (applied when a field is omitted, in code or in a tree file):
  wrong_usage    "&c[!] Wrong use of command."
  usage          "/help"
  no_console     "&c[!] This is a player only command."
  no_permission  "&c[!] You do not have permissions to execute this command."

Messages are stored as written. Color codes such as `&c` are left for the
host's message sink to render.

In YAML an explicit `null` disables a message while an absent key keeps
the default:

```yaml
name: reload
console: true
permission: cmd.reload
no_permission: null
```
*/

use serde::{Deserialize, Serialize};

pub const DEFAULT_WRONG_USAGE: &str = "&c[!] Wrong use of command.";
pub const DEFAULT_USAGE: &str = "/help";
pub const DEFAULT_NO_CONSOLE: &str = "&c[!] This is a player only command.";
pub const DEFAULT_NO_PERMISSION: &str =
    "&c[!] You do not have permissions to execute this command.";

fn default_wrong_usage() -> Option<String> {
    Some(DEFAULT_WRONG_USAGE.to_string())
}
fn default_usage() -> Option<String> {
    Some(DEFAULT_USAGE.to_string())
}
fn default_no_console() -> Option<String> {
    Some(DEFAULT_NO_CONSOLE.to_string())
}
fn default_no_permission() -> Option<String> {
    Some(DEFAULT_NO_PERMISSION.to_string())
}

/// Static policy and identity of one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Canonical name. Matched case-insensitively.
    pub name: String,

    /// Alternate names, lowercased when the node is built.
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Whether a console caller may run this command.
    #[serde(default, rename = "console")]
    pub allow_console: bool,

    /// Permission key required to run (and to be offered in completion).
    #[serde(default)]
    pub permission: Option<String>,

    /// Prefix of the usage message.
    #[serde(default = "default_wrong_usage")]
    pub wrong_usage: Option<String>,

    /// Body of the usage message.
    #[serde(default = "default_usage")]
    pub usage: Option<String>,

    #[serde(default = "default_no_console")]
    pub no_console: Option<String>,

    #[serde(default = "default_no_permission")]
    pub no_permission: Option<String>,
}

impl NodeSpec {
    /// Spec with every default applied: interactive-only, no permission.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            allow_console: false,
            permission: None,
            wrong_usage: default_wrong_usage(),
            usage: default_usage(),
            no_console: default_no_console(),
            no_permission: default_no_permission(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn console(mut self, allow: bool) -> Self {
        self.allow_console = allow;
        self
    }

    pub fn permission(mut self, key: impl Into<String>) -> Self {
        self.permission = Some(key.into());
        self
    }

    pub fn wrong_usage(mut self, text: Option<&str>) -> Self {
        self.wrong_usage = text.map(str::to_string);
        self
    }

    pub fn usage(mut self, text: Option<&str>) -> Self {
        self.usage = text.map(str::to_string);
        self
    }

    pub fn no_console_message(mut self, text: Option<&str>) -> Self {
        self.no_console = text.map(str::to_string);
        self
    }

    pub fn no_permission_message(mut self, text: Option<&str>) -> Self {
        self.no_permission = text.map(str::to_string);
        self
    }

    /// Resolve the messages a built node carries.
    ///
    /// The usage message is the wrong-usage prefix followed by the usage
    /// body; if one half is disabled the other is used alone.
    pub fn messages(&self) -> Messages {
        let usage = match (&self.wrong_usage, &self.usage) {
            (Some(prefix), Some(body)) => Some(format!("{prefix}{body}")),
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        };
        Messages {
            no_console: self.no_console.clone(),
            no_permission: self.no_permission.clone(),
            usage,
        }
    }
}

/// Caller-facing text attached to a built node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Messages {
    pub no_console: Option<String>,
    pub no_permission: Option<String>,
    pub usage: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_defaults() {
        let spec = NodeSpec::new("town");
        assert!(!spec.allow_console);
        assert!(spec.permission.is_none());
        assert_eq!(spec.no_console.as_deref(), Some(DEFAULT_NO_CONSOLE));
        assert_eq!(spec.no_permission.as_deref(), Some(DEFAULT_NO_PERMISSION));
    }

    #[test]
    fn usage_concatenates_prefix_and_body() {
        let m = NodeSpec::new("town").usage(Some(" /town <info|create>")).messages();
        assert_eq!(
            m.usage.as_deref(),
            Some("&c[!] Wrong use of command. /town <info|create>")
        );

        let m = NodeSpec::new("town").wrong_usage(None).messages();
        assert_eq!(m.usage.as_deref(), Some("/help"));

        let m = NodeSpec::new("town").wrong_usage(None).usage(None).messages();
        assert!(m.usage.is_none());
    }

    #[test]
    fn yaml_missing_keys_take_defaults() {
        let spec: NodeSpec = serde_yaml::from_str("name: heal\naliases: [H]\n").unwrap();
        assert_eq!(spec.name, "heal");
        assert_eq!(spec.aliases, vec!["H".to_string()]);
        assert!(!spec.allow_console);
        assert_eq!(spec.no_permission.as_deref(), Some(DEFAULT_NO_PERMISSION));
    }

    #[test]
    fn yaml_null_disables_message() {
        let spec: NodeSpec = serde_yaml::from_str(
            "name: reload\nconsole: true\npermission: cmd.reload\nno_permission: null\n",
        )
        .unwrap();
        assert!(spec.allow_console);
        assert_eq!(spec.permission.as_deref(), Some("cmd.reload"));
        assert!(spec.no_permission.is_none());
        assert!(spec.no_console.is_some());
    }
}
