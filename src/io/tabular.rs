//! Line-oriented tokenizer for comma-separated parameter tables.
//!
//! Rows are yielded as trimmed string fields tagged with their 1-based line
//! number. Trailing blank lines (or the end of input) end the data; a blank
//! line with more rows after it is reported as a [`Row::Gap`].

/// One step of the tokenizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Row<'a> {
    Record { line: usize, fields: Vec<&'a str> },
    /// Blank line followed by further non-blank lines.
    Gap { line: usize },
    EndOfData,
}

pub struct TabularReader<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    finished: bool,
}

impl<'a> TabularReader<'a> {
    /// Tokenize `text`, discarding the first line when `has_header` is set.
    pub fn new(text: &'a str, has_header: bool) -> Self {
        let mut lines = text.lines().enumerate();
        if has_header {
            lines.next();
        }
        Self {
            lines,
            finished: false,
        }
    }

    pub fn next_row(&mut self) -> Row<'a> {
        if self.finished {
            return Row::EndOfData;
        }
        match self.lines.next() {
            Some((idx, raw)) if !raw.trim().is_empty() => Row::Record {
                line: idx + 1,
                fields: raw.split(',').map(str::trim).collect(),
            },
            Some((idx, _)) => {
                self.finished = true;
                if self.lines.clone().any(|(_, l)| !l.trim().is_empty()) {
                    Row::Gap { line: idx + 1 }
                } else {
                    Row::EndOfData
                }
            }
            None => {
                self.finished = true;
                Row::EndOfData
            }
        }
    }
}

/// Parse a numeric field, returning a description of the problem otherwise.
pub fn parse_number(field: Option<&&str>, column: &str) -> Result<f64, String> {
    let raw = field.ok_or_else(|| format!("missing column '{column}'"))?;
    raw.parse::<f64>()
        .map_err(|e| format!("column '{column}' value '{raw}': {e}"))
}
