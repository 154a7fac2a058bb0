//! Fixed-width text tables.
//!
//! Every column is left-justified to its widest cell (header included) and
//! columns are separated by two spaces. Trailing padding is trimmed.

use super::terminal::pad_field;

const COLUMN_SEPARATOR: &str = "  ";

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }
    widths
}

fn render_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| pad_field(cell.as_ref(), *width))
        .collect::<Vec<String>>()
        .join(COLUMN_SEPARATOR);
    line.trim_end().to_string()
}

/// Header line followed by the rows, no rule.
pub fn render_columns(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths = column_widths(headers, rows);
    let mut out = String::new();
    out.push_str(&render_line(headers, &widths));
    out.push('\n');
    for row in rows {
        out.push_str(&render_line(row, &widths));
        out.push('\n');
    }
    out
}

/// Header line, a dashed rule under each column, then the rows.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths = column_widths(headers, rows);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut out = String::new();
    out.push_str(&render_line(headers, &widths));
    out.push('\n');
    out.push_str(&render_line(&rule, &widths));
    out.push('\n');
    for row in rows {
        out.push_str(&render_line(row, &widths));
        out.push('\n');
    }
    out
}
