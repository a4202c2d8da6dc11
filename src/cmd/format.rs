/*!
format.rs

Human output helpers for the `cmdtree` CLI.

  - StyleOptions::detect()          NO_COLOR / COLUMNS aware style
  - color(role, text, &style)       ANSI role coloring
  - render_codes(text, &style)      `&c`-style color codes -> ANSI (or stripped)
  - box_header(title, sub, &style)  one-line boxed title
  - table(headers, rows, &style)    aligned columns

Command messages carry `&`-prefixed color codes (`&c` red, `&a` green,
`&l` bold, `&r` reset ...). The core passes them through untouched; this
module is where the CLI's message sink turns them into terminal escapes.

JSON output paths must not use these helpers.
*/

use std::borrow::Cow;

/* -------------------------------------------------------------------------- */
/* Style Options                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 220))
            .unwrap_or(100);

        StyleOptions {
            use_color: std::env::var_os("NO_COLOR").is_none(),
            term_width: width,
        }
    }

    pub fn plain() -> Self {
        StyleOptions {
            use_color: false,
            term_width: 100,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Color                                                                      */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Primary,
    Secondary,
    Accent,
    Warning,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Primary => "38;5;45",    // cyan-ish
        Role::Secondary => "38;5;250", // gray
        Role::Accent => "38;5;213",    // magenta/pink
        Role::Warning => "38;5;214",   // orange
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/// SGR parameters for one `&x` code, or `None` if `x` is not a code.
fn code_sgr(code: char) -> Option<&'static str> {
    let sgr = match code.to_ascii_lowercase() {
        '0' => "30",
        '1' => "34",
        '2' => "32",
        '3' => "36",
        '4' => "31",
        '5' => "35",
        '6' => "33",
        '7' => "37",
        '8' => "90",
        '9' => "94",
        'a' => "92",
        'b' => "96",
        'c' => "91",
        'd' => "95",
        'e' => "93",
        'f' => "97",
        'l' => "1",
        'm' => "9",
        'n' => "4",
        'o' => "3",
        'r' => "0",
        _ => return None,
    };
    Some(sgr)
}

/// Translate `&`-prefixed color codes.
///
/// With color enabled each code becomes an SGR escape and a reset is
/// appended if any code was used; without color the codes are removed.
/// An `&` not followed by a known code is kept literally.
pub fn render_codes(text: &str, style: &StyleOptions) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut used = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '&'
            && let Some(&next) = chars.peek()
            && let Some(sgr) = code_sgr(next)
        {
            chars.next();
            if style.use_color {
                out.push_str("\x1b[");
                out.push_str(sgr);
                out.push('m');
                used = true;
            }
            continue;
        }
        out.push(c);
    }
    if used {
        out.push_str("\x1b[0m");
    }
    out
}

/* -------------------------------------------------------------------------- */
/* Box Header                                                                 */
/* -------------------------------------------------------------------------- */

pub fn box_header(
    title: impl AsRef<str>,
    subtitle: Option<impl AsRef<str>>,
    style: &StyleOptions,
) -> String {
    let title_styled = color(Role::Primary, title.as_ref(), style);
    let inner = match subtitle {
        Some(sub) => format!(
            "{title_styled}  {}",
            color(Role::Secondary, sub.as_ref(), style)
        ),
        None => title_styled,
    };

    let max_inner = style.term_width.saturating_sub(4).max(10);
    let inner = if display_width(&inner) > max_inner {
        truncate_ellipsis(&strip_ansi(&inner), max_inner)
    } else {
        inner
    };
    let width = display_width(&inner) + 2;

    format!(
        "┌{h}┐\n│ {inner} │\n└{h}┘",
        h = "─".repeat(width)
    )
}

/* -------------------------------------------------------------------------- */
/* Table Rendering                                                             */
/* -------------------------------------------------------------------------- */

/// Left-aligned columns separated by two spaces, header underlined.
/// Cells wider than the terminal share are cut with an ellipsis.
pub fn table(headers: &[&str], rows: &[Vec<String>], style: &StyleOptions) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let cols = headers.len();
    let cap = (style.term_width / cols).max(8);

    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(cols) {
            widths[i] = widths[i].max(display_width(cell).min(cap));
        }
    }

    let render_row = |cells: Vec<String>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, cell)| pad(&truncate_ellipsis(cell, widths[i]), widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    let header_line = render_row(headers.iter().map(|h| h.to_string()).collect());
    lines.push(color(Role::Accent, header_line, style));
    let sep = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join("  ");
    lines.push(color(Role::Dim, sep, style));
    for row in rows {
        let mut cells: Vec<String> = row.iter().take(cols).cloned().collect();
        cells.resize(cols, String::new());
        lines.push(render_row(cells));
    }
    lines.join("\n")
}

fn pad(s: &str, width: usize) -> String {
    let len = display_width(s);
    if len >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - len))
    }
}

/* -------------------------------------------------------------------------- */
/* Text Helpers                                                                */
/* -------------------------------------------------------------------------- */

pub fn truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if display_width(s) <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".into();
    }
    let plain = strip_ansi(s);
    let mut out: String = plain.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

/// Remove CSI escape sequences (ESC '[' ... final letter).
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for t in chars.by_ref() {
                if t.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                       */
/* -------------------------------------------------------------------------- */
