//! Plain-text rendering of the session views.

use midbg_session::{ModelKind, ViewTable};
use unicode_width::UnicodeWidthStr;

const COLUMN_GAP: &str = "  ";

/// Renders a view as an aligned table with a header row.
///
/// Columns are sized by display width, so wide characters in values keep
/// the table aligned on terminals.
pub(crate) fn render_table(table: &ViewTable) -> String {
    if table.rows.is_empty() {
        return format!("(no {})\n", empty_label(table.kind));
    }

    let headers = table.headers();
    let mut widths: Vec<usize> = headers.iter().map(|header| header.width()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    let mut output = String::new();
    push_row(&mut output, headers.iter().copied(), &widths);
    for row in &table.rows {
        push_row(&mut output, row.iter().map(String::as_str), &widths);
    }
    output
}

fn push_row<'a>(output: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let mut line = String::new();
    for (index, (cell, width)) in cells.zip(widths).enumerate() {
        if index > 0 {
            line.push_str(COLUMN_GAP);
        }
        line.push_str(cell);
        line.extend(std::iter::repeat_n(' ', width.saturating_sub(cell.width())));
    }
    output.push_str(line.trim_end());
    output.push('\n');
}

const fn empty_label(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::Execution => "stop location",
        ModelKind::Locals => "locals",
        ModelKind::CallStack => "stack frames",
    }
}

/// One-line summary of a stop location row.
pub(crate) fn render_stop(table: &ViewTable) -> Option<String> {
    let row = table.rows.first()?;
    let cell = |index: usize| row.get(index).map_or("", String::as_str);
    let (address, function, file, line) = (cell(0), cell(1), cell(2), cell(3));
    let location = if file.is_empty() {
        format!("{function} at {address}")
    } else {
        format!("{function} ({file}:{line})")
    };
    Some(format!("stopped in {location}\n"))
}
