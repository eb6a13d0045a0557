//! Plain-text table rendering for terminal output.
//!
//! Stateless: width and precision are passed in on every call. Tables wider
//! than `max_width` are split into column blocks printed one after another.

/// Renders `value` with `precision` decimals, or `null` when missing.
pub fn format_value(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "null".to_string(),
    }
}

pub fn render_table(headers: &[&str], rows: &[Vec<String>], max_width: usize) -> String {
    if headers.is_empty() {
        return String::new();
    }

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    column_blocks(&widths, max_width)
        .into_iter()
        .map(|cols| render_block(headers, rows, &widths, &cols))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Groups column indices so each block fits in `max_width` (at least one
/// column per block).
fn column_blocks(widths: &[usize], max_width: usize) -> Vec<Vec<usize>> {
    let mut blocks: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut used = 1;

    for (col, &w) in widths.iter().enumerate() {
        // "| " + cell + " " per column, plus the closing "|"
        let needed = w + 3;
        if !current.is_empty() && used + needed > max_width {
            blocks.push(std::mem::take(&mut current));
            used = 1;
        }
        current.push(col);
        used += needed;
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn render_block(headers: &[&str], rows: &[Vec<String>], widths: &[usize], cols: &[usize]) -> String {
    let rule = |fill: char| {
        let mut line = String::from("+");
        for &c in cols {
            line.extend(std::iter::repeat_n(fill, widths[c] + 2));
            line.push('+');
        }
        line
    };
    let line = |cells: &dyn Fn(usize) -> String| {
        let mut out = String::from("|");
        for &c in cols {
            out.push_str(&format!(" {:<width$} |", cells(c), width = widths[c]));
        }
        out
    };

    let mut out = vec![rule('-'), line(&|c: usize| headers[c].to_string()), rule('=')];
    for row in rows {
        out.push(line(&|c: usize| row.get(c).cloned().unwrap_or_default()));
    }
    out.push(rule('-'));
    out.join("\n") + "\n"
}
