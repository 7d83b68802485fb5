use std::ops::Range;

/// Minimum cells for a line to count as a table row.
const MIN_CELLS: usize = 3;
/// Minimum consecutive rows, header included.
const MIN_LINES: usize = 2;

/// A table recovered from column-aligned page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTable {
    pub header: Vec<String>,
    /// Every row has exactly `header.len()` cells.
    pub rows: Vec<Vec<String>>,
    /// Zero-based indices of the text lines the table was read from.
    pub lines: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cell {
    /// Character columns, end exclusive.
    start: usize,
    end: usize,
    text: String,
}

impl Cell {
    fn overlap(&self, other: &Cell) -> usize {
        self.end.min(other.end).saturating_sub(self.start.max(other.start))
    }

    fn center2(&self) -> usize {
        self.start + self.end
    }
}

/// Find tables in page text: runs of at least two consecutive lines, each
/// splitting into three or more cells on gaps of two or more spaces.
pub fn detect_tables(text: &str) -> Vec<TextTable> {
    let lines: Vec<Vec<Cell>> = text.lines().map(split_cells).collect();
    let mut tables = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].len() < MIN_CELLS {
            i += 1;
            continue;
        }
        let start = i;
        while i < lines.len() && lines[i].len() >= MIN_CELLS {
            i += 1;
        }
        if i - start >= MIN_LINES {
            tables.push(build_table(&lines[start..i], start..i));
        }
    }
    tables
}

fn build_table(block: &[Vec<Cell>], lines: Range<usize>) -> TextTable {
    let header_cells = &block[0];
    let header = header_cells.iter().map(|c| c.text.clone()).collect();
    let rows = block[1..].iter().map(|row| align(header_cells, row)).collect();
    TextTable { header, rows, lines }
}

/// Place row cells under header columns. Equal counts map by position;
/// otherwise each cell goes to the column it overlaps most, or the nearest one.
fn align(header: &[Cell], row: &[Cell]) -> Vec<String> {
    if row.len() == header.len() {
        return row.iter().map(|c| c.text.clone()).collect();
    }

    let mut out = vec![String::new(); header.len()];
    for cell in row {
        let best = header
            .iter()
            .enumerate()
            .max_by_key(|(_, h)| (h.overlap(cell), std::cmp::Reverse(h.center2().abs_diff(cell.center2()))))
            .map(|(i, _)| i)
            .unwrap_or(0);
        if out[best].is_empty() {
            out[best] = cell.text.clone();
        } else {
            out[best].push(' ');
            out[best].push_str(&cell.text);
        }
    }
    out
}

fn split_cells(line: &str) -> Vec<Cell> {
    // A tab always separates cells.
    let chars: Vec<char> = line.replace('\t', "  ").chars().collect();
    let mut cells = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == ' ' {
            i += 1;
            continue;
        }
        let start = i;
        // A single space stays inside the cell; two or more end it.
        while i < chars.len() && !(chars[i] == ' ' && chars.get(i + 1).map_or(true, |c| *c == ' ')) {
            i += 1;
        }
        cells.push(Cell {
            start,
            end: i,
            text: chars[start..i].iter().collect(),
        });
    }
    cells
}
