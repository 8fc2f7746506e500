/// A long-format table exactly as the statistics API returned it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column names from the CSV header row, e.g. `HERKOMST`, `TID`, `INDHOLD`.
    pub headers: Vec<String>,
    /// Each data row, as a Vec of Strings (one per field).
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Literal tables for tests.
    #[cfg(test)]
    pub(crate) fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|f| f.to_string()).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header position, ignoring ASCII case (the API echoes `tid` as `TID`).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }
}
