//! Line commands and text rendering for `placesearch interactive`.

use std::fmt::Write as _;

use placesearch_core::{PlaceRecord, Snapshot};

pub const HELP: &str = "\
Type a country name to search. Commands:
  :page N   jump to page N
  :next     next page
  :prev     previous page
  :size N   cities per page (1 - 10)
  :show     print the current state again
  :help     this text
  :quit     exit";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Text(String),
    Page(u32),
    Next,
    Prev,
    Size(String),
    Show,
    Help,
    Quit,
}

/// Anything not starting with `:` is a text edit, including the empty line.
pub fn parse_line(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.trim_start().strip_prefix(':') else {
        return Ok(ReplCommand::Text(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let cmd = parts.next().unwrap_or("");
    let arg = parts.next();

    match (cmd, arg) {
        ("page" | "p", Some(n)) => n
            .parse()
            .map(ReplCommand::Page)
            .map_err(|_| format!("not a page number: {n}")),
        ("page" | "p", None) => Err("usage: :page N".into()),
        ("next" | "n", _) => Ok(ReplCommand::Next),
        ("prev" | "previous", _) => Ok(ReplCommand::Prev),
        // Validation is the controller's job; pass the raw text through.
        ("size" | "s", Some(n)) => Ok(ReplCommand::Size(n.to_string())),
        ("size" | "s", None) => Err("usage: :size N".into()),
        ("show", _) => Ok(ReplCommand::Show),
        ("help" | "h" | "?", _) => Ok(ReplCommand::Help),
        ("quit" | "q" | "exit", _) => Ok(ReplCommand::Quit),
        (other, _) => Err(format!("unknown command :{other} (try :help)")),
    }
}

/// Renders a snapshot the way the table view shows it: status message or
/// rows, then the page-size box and pagination when they apply.
pub fn render(snap: &Snapshot) -> String {
    let mut out = String::new();
    let status = snap.status_message();

    if !status.is_empty() {
        let _ = writeln!(out, "{status}");
    } else if !snap.rows.is_empty() {
        let _ = writeln!(
            out,
            "{:>4}  {:<28} {:<24} {:>12}  Country",
            "#", "Place Name", "Region", "Population"
        );
        for (i, row) in snap.rows.iter().enumerate() {
            let _ = writeln!(out, "{}", render_row(snap.row_number(i), row));
        }
    }

    if snap.shows_page_size_input() {
        let _ = writeln!(out, "Cities per page (1 - 10): {}", snap.page_size);
    }
    if snap.shows_pagination() {
        let prev = if snap.previous_page().is_some() { "[:prev]" } else { "( prev)" };
        let next = if snap.next_page().is_some() { "[:next]" } else { "( next)" };
        let _ = writeln!(
            out,
            "{prev} page {} of {} {next}",
            snap.current_page, snap.total_pages
        );
    }
    out
}

fn render_row(number: u64, row: &PlaceRecord) -> String {
    let country = match &row.country_code {
        Some(code) => format!("{} ({code})", row.country_name),
        None => format!("{} (no flag)", row.country_name),
    };
    format!(
        "{number:>4}  {:<28} {:<24} {:>12}  {country}",
        truncate(&row.name, 28),
        truncate(&row.region, 24),
        row.population
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}
