use std::collections::BTreeSet;
use std::fmt::Display;

use itertools::Itertools;

/// The triangular CYK table: the nonterminals deriving every span of tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CykTable {
    tokens: Vec<String>,
    // cells[i][j - i] covers tokens i..=j
    cells: Vec<Vec<BTreeSet<String>>>,
}

impl CykTable {
    pub(crate) fn new(tokens: Vec<String>) -> Self {
        let n = tokens.len();
        CykTable {
            tokens,
            cells: (0..n).map(|i| vec![BTreeSet::new(); n - i]).collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    // 0-indexed and inclusive. Panics outside the word.
    pub fn cell(&self, start: usize, end: usize) -> &BTreeSet<String> {
        &self.cells[start][end - start]
    }

    pub(crate) fn cell_mut(&mut self, start: usize, end: usize) -> &mut BTreeSet<String> {
        &mut self.cells[start][end - start]
    }
}

fn render_cell(cell: &BTreeSet<String>) -> String {
    if cell.is_empty() {
        "∅".to_string()
    } else {
        format!("{{{}}}", cell.iter().join(","))
    }
}

impl Display for CykTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let n = self.tokens.len();
        if n == 0 {
            return write!(f, "Word: ε");
        }
        writeln!(f, "Word: {}", self.tokens.join(" "))?;

        let rendered = (0..n)
            .map(|i| (0..n).map(|j| if i <= j { render_cell(self.cell(i, j)) } else { String::new() }).collect_vec())
            .collect_vec();
        let widths = (0..n)
            .map(|j| (0..n).map(|i| rendered[i][j].chars().count()).max().unwrap_or(1))
            .collect_vec();
        let label_width = format!("i={}", n).len();

        let header = widths.iter().enumerate().map(|(j, w)| format!("{:^w$}", j + 1, w = *w)).join(" ");
        writeln!(f, "{:label_width$}   {}", "", header.trim_end(), label_width = label_width)?;
        writeln!(
            f,
            "{:label_width$}   {}",
            "",
            "-".repeat(widths.iter().sum::<usize>() + n - 1),
            label_width = label_width
        )?;

        let rows = rendered.iter().enumerate().map(|(i, row)| {
            let cells = row.iter().zip(&widths).map(|(cell, w)| format!("{:^w$}", cell, w = *w)).join(" ");
            format!("{:label_width$} | {}", format!("i={}", i + 1), cells, label_width = label_width)
                .trim_end()
                .to_string()
        });
        write!(f, "{}", rows.into_iter().join("\n"))
    }
}
