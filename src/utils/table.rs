/// Column alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Monospace text table rendered inside a Discord code block.
///
/// Used for wallet valuations and rate listings, where amounts read best
/// right-aligned under their header.
pub struct Table {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
    footer: Option<Vec<String>>,
    col_widths: Vec<usize>,
}

impl Table {
    /// Create a table; every column is left-aligned until [`Table::align`] says otherwise
    pub fn new(headers: &[&str]) -> Self {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            aligns: vec![Align::Left; headers.len()],
            rows: Vec::new(),
            footer: None,
            col_widths: headers.iter().map(|h| h.chars().count()).collect(),
        }
    }

    pub fn align(mut self, aligns: &[Align]) -> Self {
        for (slot, align) in self.aligns.iter_mut().zip(aligns) {
            *slot = *align;
        }
        self
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.widen(&row);
        self.rows.push(row);
    }

    /// A summary row drawn below a second separator (totals)
    pub fn set_footer(&mut self, row: Vec<String>) {
        self.widen(&row);
        self.footer = Some(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let mut output = String::from("```\n");
        output.push_str(&self.render_row(&self.headers));
        output.push('\n');
        output.push_str(&self.render_separator());
        output.push('\n');

        for row in &self.rows {
            output.push_str(&self.render_row(row));
            output.push('\n');
        }

        if let Some(footer) = &self.footer {
            output.push_str(&self.render_separator());
            output.push('\n');
            output.push_str(&self.render_row(footer));
            output.push('\n');
        }

        output.push_str("```");
        output
    }

    fn widen(&mut self, row: &[String]) {
        for (width, col) in self.col_widths.iter_mut().zip(row) {
            *width = (*width).max(col.chars().count());
        }
    }

    fn render_row(&self, row: &[String]) -> String {
        let cells: Vec<String> = self
            .col_widths
            .iter()
            .zip(&self.aligns)
            .enumerate()
            .map(|(i, (&width, align))| {
                let col = row.get(i).map(String::as_str).unwrap_or("");
                match align {
                    Align::Left => format!("{:<width$}", col, width = width),
                    Align::Right => format!("{:>width$}", col, width = width),
                }
            })
            .collect();
        cells.join(" | ").trim_end().to_string()
    }

    fn render_separator(&self) -> String {
        self.col_widths
            .iter()
            .map(|&width| "-".repeat(width))
            .collect::<Vec<_>>()
            .join("-+-")
    }
}
