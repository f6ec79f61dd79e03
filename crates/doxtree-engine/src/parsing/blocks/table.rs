use doxtree_syntax::kinds::TableSyntax;

use crate::model::{Alignment, Table, TableCell, TableRow};
use crate::parsing::inline::parse_inline;

struct CellDraft {
    text: String,
    span: usize,
    row_span: usize,
    merged_up: bool,
}

struct RowDraft {
    header: bool,
    cells: Vec<CellDraft>,
}

/// Accumulates pipe-table rows and their horizontal and vertical merges.
pub struct TableBuilder {
    columns: usize,
    alignment: Option<Vec<Alignment>>,
    rows: Vec<RowDraft>,
    /// For each logical column, the (row, cell) that last covered it.
    origins: Vec<Option<(usize, usize)>>,
}

/// Merges `||` into the preceding cell's span.
fn logical_cells(raw: Vec<String>) -> Vec<CellDraft> {
    let mut cells: Vec<CellDraft> = vec![];
    for cell in raw {
        if cell.is_empty()
            && let Some(prev) = cells.last_mut()
        {
            prev.span += 1;
            continue;
        }
        let text = cell.trim().to_string();
        cells.push(CellDraft {
            merged_up: text == TableSyntax::MERGE_UP,
            text,
            span: 1,
            row_span: 1,
        });
    }
    cells
}

fn width(cells: &[CellDraft]) -> usize {
    cells.iter().map(|c| c.span).sum()
}

impl TableBuilder {
    pub fn new(cells: Vec<String>) -> Self {
        let first = logical_cells(cells);
        let columns = width(&first);
        let mut table = Self {
            columns,
            alignment: None,
            rows: vec![],
            origins: vec![None; columns],
        };
        table.accept(first);
        table
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Whether the next line may be the header separator.
    pub fn awaits_separator(&self) -> bool {
        self.alignment.is_none() && self.rows.len() == 1
    }

    /// Applies the separator; returns the found column count on mismatch.
    pub fn set_alignment(&mut self, alignments: Vec<Alignment>) -> Result<(), usize> {
        let found = alignments.len();
        let mut alignments = alignments;
        alignments.resize(self.columns, Alignment::Left);
        self.alignment = Some(alignments);
        if let Some(header) = self.rows.first_mut() {
            header.header = true;
        }
        if found == self.columns {
            Ok(())
        } else {
            Err(found)
        }
    }

    /// Adds a row, or returns the width of a row that does not fit the
    /// column count.
    pub fn push_row(&mut self, raw_cells: Vec<String>) -> Result<(), usize> {
        let mut cells = logical_cells(raw_cells);
        // Trailing blank cells past the declared width are padding
        while width(&cells) > self.columns
            && cells
                .last()
                .is_some_and(|c| c.span == 1 && c.text.is_empty())
        {
            cells.pop();
        }
        let found = width(&cells);
        if found != self.columns {
            return Err(found);
        }
        self.accept(cells);
        Ok(())
    }

    fn accept(&mut self, mut cells: Vec<CellDraft>) {
        let row = self.rows.len();
        let mut col = 0;
        for (idx, cell) in cells.iter_mut().enumerate() {
            if cell.merged_up {
                match self.origins.get(col).copied().flatten() {
                    Some((r, c)) => self.rows[r].cells[c].row_span += 1,
                    None => cell.merged_up = false,
                }
            }
            if !cell.merged_up {
                for slot in self.origins.iter_mut().skip(col).take(cell.span) {
                    *slot = Some((row, idx));
                }
            }
            col += cell.span;
        }
        self.rows.push(RowDraft {
            header: false,
            cells,
        });
    }

    pub fn finish(self) -> Table {
        let columns = self.columns;
        Table {
            alignment: self
                .alignment
                .unwrap_or_else(|| vec![Alignment::Left; columns]),
            rows: self
                .rows
                .into_iter()
                .map(|row| TableRow {
                    header: row.header,
                    cells: row
                        .cells
                        .into_iter()
                        .map(|cell| TableCell {
                            span: cell.span,
                            row_span: cell.row_span,
                            merged_up: cell.merged_up,
                            body: if cell.merged_up {
                                vec![]
                            } else {
                                parse_inline(&cell.text)
                            },
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
