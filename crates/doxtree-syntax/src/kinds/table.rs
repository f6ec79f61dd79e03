use crate::cursor::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Pipe table line syntax.
pub struct TableSyntax;

impl TableSyntax {
    pub const PIPE: u8 = b'|';
    /// Cell text meaning "continue the cell above".
    pub const MERGE_UP: &'static str = "^";

    /// Splits a `| a | b |` row into raw cell texts.
    ///
    /// Cells keep their surrounding spaces so that `||` (an empty cell,
    /// meaning horizontal merge) stays distinguishable from `| |`.
    pub fn split_row(line: &str) -> Option<Vec<String>> {
        let t = line.trim();
        let inner = t.strip_prefix('|')?;
        let inner = match inner.strip_suffix('|') {
            Some(body) if !body.ends_with('\\') => body,
            _ => inner,
        };
        if !t[1..].contains('|') {
            return None;
        }

        let mut cells = vec![];
        let mut cur = Cursor::new(inner);
        let mut cell = String::new();
        while let Some(b) = cur.peek() {
            if b == b'\\' && cur.starts_with(b"\\|") {
                cell.push('|');
                cur.bump_n(2);
                continue;
            }
            if b == Self::PIPE {
                cells.push(std::mem::take(&mut cell));
                cur.bump();
                continue;
            }
            let ch = cur.rest().chars().next().unwrap_or(' ');
            cell.push(ch);
            cur.bump_n(ch.len_utf8());
        }
        cells.push(cell);
        Some(cells)
    }

    /// Parses a separator line such as `|:---|:---:|---:|`.
    pub fn separator(line: &str) -> Option<Vec<Alignment>> {
        let t = line.trim();
        if !t.contains('|') {
            return None;
        }
        let inner = t.strip_prefix('|').unwrap_or(t);
        let inner = inner.strip_suffix('|').unwrap_or(inner);

        inner
            .split('|')
            .map(|cell| {
                let c = cell.trim();
                let dashes = c.trim_start_matches(':').trim_end_matches(':');
                if dashes.is_empty() || !dashes.bytes().all(|b| b == b'-') {
                    return None;
                }
                Some(match (c.starts_with(':'), c.ends_with(':')) {
                    (true, true) => Alignment::Center,
                    (false, true) => Alignment::Right,
                    _ => Alignment::Left,
                })
            })
            .collect()
    }
}
