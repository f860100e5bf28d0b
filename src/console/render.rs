//! Plain-text rendering of a `DirectoryView`.

use std::fmt::Write;

use crate::catalog::Country;
use crate::core::state::{DirectoryView, ErrorChannel};

/// Rows shown before the list is truncated.
pub const MAX_ROWS: usize = 25;

pub fn render_view(view: &DirectoryView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "── {} ── search: {:?}",
        view.selected.label(),
        view.search_query
    );

    banner(&mut out, &view.error);
    banner(&mut out, &view.search_error);

    if view.is_loading {
        out.push_str("loading…\n");
    } else if let Some(countries) = view.countries.as_deref() {
        country_rows(&mut out, countries);
    }

    if view.border_error.active || view.borders.is_some() {
        out.push_str("neighbors:\n");
        banner(&mut out, &view.border_error);
        match view.borders.as_deref() {
            Some([]) => out.push_str("  (none)\n"),
            Some(borders) => country_rows(&mut out, borders),
            None => {}
        }
    }
    out
}

fn banner(out: &mut String, channel: &ErrorChannel) {
    if channel.active {
        let _ = writeln!(out, "! {}", channel.message);
    }
}

fn country_rows(out: &mut String, countries: &[Country]) {
    for country in countries.iter().take(MAX_ROWS) {
        let _ = writeln!(out, "  {}", country_row(country));
    }
    if countries.len() > MAX_ROWS {
        let _ = writeln!(out, "  … and {} more", countries.len() - MAX_ROWS);
    }
    let _ = writeln!(out, "  {} countries", countries.len());
}

pub fn country_row(country: &Country) -> String {
    let mut row = format!(
        "{:<3}  {:<32}  {:<10}  pop {:>13}",
        country.code,
        country.name,
        country.region,
        group_thousands(country.population)
    );
    if let Some(capital) = &country.capital {
        let _ = write!(row, "  capital {capital}");
    }
    row
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
