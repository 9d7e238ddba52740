//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one line per item.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Status cell text: green for success, red for failure, dim for skipped.
pub fn status_cell(label: &str, status: Status, color: bool) -> String {
    if !color {
        return label.to_owned();
    }
    match status {
        Status::Ok => label.green().bold().to_string(),
        Status::Failed => label.red().bold().to_string(),
        Status::Skipped => label.dimmed().to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Failed,
    Skipped,
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: maps each item through `to_row` into a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `line_fn` on each item to emit one line per item
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    line_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&line_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table and plain rendering use `text_fn`, since single-item views
/// don't use the `Tabled` derive.
pub fn render_single<T>(format: &OutputFormat, data: &T, text_fn: impl Fn(&T) -> String) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table | OutputFormat::Plain => text_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Serialize)]
    struct Item {
        name: &'static str,
        ok: bool,
    }

    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "Name")]
        name: String,
    }

    fn items() -> Vec<Item> {
        vec![Item { name: "a", ok: true }, Item { name: "b", ok: false }]
    }

    #[test]
    fn plain_emits_one_line_per_item() {
        let out = render_list(
            &OutputFormat::Plain,
            &items(),
            |i| ItemRow { name: i.name.into() },
            |i| format!("{}\t{}", i.name, i.ok),
        );
        assert_eq!(out, "a\ttrue\nb\tfalse");
    }

    #[test]
    fn compact_json_is_single_line() {
        let out = render_list(
            &OutputFormat::JsonCompact,
            &items(),
            |i| ItemRow { name: i.name.into() },
            |i| i.name.to_owned(),
        );
        assert_eq!(out, r#"[{"name":"a","ok":true},{"name":"b","ok":false}]"#);
    }

    #[test]
    fn table_has_header_and_rows() {
        let out = render_list(
            &OutputFormat::Table,
            &items(),
            |i| ItemRow { name: i.name.into() },
            |i| i.name.to_owned(),
        );
        assert!(out.contains("Name"));
        assert!(out.contains('a') && out.contains('b'));
    }

    #[test]
    fn status_cell_is_plain_without_color() {
        assert_eq!(status_cell("ok", Status::Ok, false), "ok");
        assert_ne!(status_cell("ok", Status::Ok, true), "ok");
    }
}
