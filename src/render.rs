// ABOUTME: Output rendering for the CLI: aligned plain-text tables and pretty JSON.
// ABOUTME: Writers are generic so command handlers can be tested against in-memory buffers.

use std::io::{self, Write};

use stockroom_core::Record;

const HEADERS: [&str; 5] = ["ID", "Name", "Price", "Quantity", "Category"];
const COLUMN_GAP: usize = 3;

/// Write records as a left-aligned table. Every column except the last is
/// padded to its widest cell plus a three-space gap.
pub fn write_table(out: &mut impl Write, records: &[Record]) -> io::Result<()> {
    let rows: Vec<[String; 5]> = records
        .iter()
        .map(|r| {
            [
                r.id.clone(),
                r.name.clone(),
                format!("{:.2}", r.price),
                r.quantity.to_string(),
                r.category.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(out, &HEADERS.map(String::from), &widths)?;
    for row in &rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_row(out: &mut impl Write, cells: &[String; 5], widths: &[usize; 5]) -> io::Result<()> {
    let last = cells.len() - 1;
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        line.push_str(cell);
        if i < last {
            let pad = widths[i] - cell.chars().count() + COLUMN_GAP;
            line.extend(std::iter::repeat_n(' ', pad));
        }
    }
    writeln!(out, "{}", line)
}

/// Write records as a pretty-printed JSON array followed by a newline.
pub fn write_json(out: &mut impl Write, records: &[Record]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, records)?;
    writeln!(out)
}
