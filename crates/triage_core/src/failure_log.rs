/// `analysis_type` recorded when the failure log is viewed.
pub const FAILURE_SCAN: &str = "Failure Scan";

/// One flat failure record; keys keep the order the backend sent them in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FailureRow {
    cells: Vec<(String, String)>,
}

impl FailureRow {
    pub fn new(cells: Vec<(String, String)>) -> Self {
        Self { cells }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(key, _)| key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Column set of a failure table: the keys of the first row.
pub fn derive_columns(rows: &[FailureRow]) -> Vec<String> {
    rows.first()
        .map(|row| row.keys().map(ToOwned::to_owned).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FailureLog {
    open: bool,
    columns: Vec<String>,
    rows: Vec<FailureRow>,
}

impl FailureLog {
    pub(crate) fn show(rows: Vec<FailureRow>) -> Self {
        Self {
            open: true,
            columns: derive_columns(&rows),
            rows,
        }
    }

    pub(crate) fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FailureRow] {
        &self.rows
    }

    /// Cell text per row, aligned to the column set. Missing keys render empty.
    pub fn table(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| row.get(column).unwrap_or_default().to_string())
                    .collect()
            })
            .collect()
    }
}
