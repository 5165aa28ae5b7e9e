//! Plain-text and Markdown tables.

/// A table of string cells with a header row.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded, extra cells are dropped.
    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .map(Into::into)
            .take(self.headers.len())
            .collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Render as an ASCII grid.
    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let border = {
            let mut line = String::from("+");
            for width in &widths {
                line.push_str(&"-".repeat(width + 2));
                line.push('+');
            }
            line.push('\n');
            line
        };

        let format_row = |cells: &[String]| {
            let mut line = String::from("|");
            for (cell, width) in cells.iter().zip(&widths) {
                let pad = width - cell.chars().count();
                line.push(' ');
                line.push_str(cell);
                line.push_str(&" ".repeat(pad + 1));
                line.push('|');
            }
            line.push('\n');
            line
        };

        let mut output = String::new();
        output.push_str(&border);
        output.push_str(&format_row(&self.headers));
        output.push_str(&border);
        for row in &self.rows {
            output.push_str(&format_row(row));
        }
        output.push_str(&border);
        output
    }

    /// Render as a GitHub-flavoured Markdown table.
    pub fn to_markdown(&self) -> String {
        let escape = |cell: &str| cell.replace('|', "\\|");

        let mut output = String::new();
        output.push_str(&format!(
            "| {} |\n",
            self.headers
                .iter()
                .map(|h| escape(h))
                .collect::<Vec<_>>()
                .join(" | ")
        ));
        output.push_str(&format!(
            "|{}|\n",
            vec![":---"; self.headers.len()].join("|")
        ));
        for row in &self.rows {
            output.push_str(&format!(
                "| {} |\n",
                row.iter().map(|c| escape(c)).collect::<Vec<_>>().join(" | ")
            ));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_grid() {
        let mut table = TextTable::new(["Job Title", "Count"]);
        table.add_row(["Developer, back-end", "12"]);
        table.add_row(["QA", "3"]);

        let rendered = table.render();
        let lines: Vec<_> = rendered.lines().collect();

        assert_eq!(lines[0], "+---------------------+-------+");
        assert_eq!(lines[1], "| Job Title           | Count |");
        assert_eq!(lines[3], "| Developer, back-end | 12    |");
        assert_eq!(lines[4], "| QA                  | 3     |");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_row_padding() {
        let mut table = TextTable::new(["A", "B", "C"]);
        table.add_row(["1"]);
        table.add_row(["1", "2", "3", "4"]);

        let rendered = table.render();
        assert!(rendered.contains("| 1 |   |   |"));
        assert!(!rendered.contains('4'));
    }

    #[test]
    fn test_markdown() {
        let mut table = TextTable::new(["Stack", "Count"]);
        table.add_row(["C|C++", "2"]);

        let md = table.to_markdown();
        assert!(md.starts_with("| Stack | Count |\n|:---|:---|\n"));
        assert!(md.contains("| C\\|C++ | 2 |"));
    }
}
