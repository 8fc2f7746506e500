use serde::Serialize;

/// One dimension filter: the dimension code and the value codes to request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub code: String,
    pub values: Vec<String>,
}

/// What to ask the statistics API for: a table id, dimension filters and an output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub table: String,
    pub format: String,
    pub variables: Vec<Variable>,
}

impl TableQuery {
    /// A CSV query for `table` with no filters yet.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            format: "CSV".into(),
            variables: Vec::new(),
        }
    }

    /// Add (or replace) the filter for one dimension.
    pub fn var<I, S>(mut self, code: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.variables.iter_mut().find(|v| v.code == code) {
            Some(existing) => existing.values = values,
            None => self.variables.push(Variable {
                code: code.to_string(),
                values,
            }),
        }
        self
    }

    pub fn values(&self, code: &str) -> Option<&[String]> {
        self.variables
            .iter()
            .find(|v| v.code == code)
            .map(|v| v.values.as_slice())
    }
}

/// Request body for the `/data` endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DataRequest<'a> {
    pub table: &'a str,
    pub format: &'a str,
    pub value_presentation: &'a str,
    pub variables: &'a [Variable],
}

impl<'a> From<&'a TableQuery> for DataRequest<'a> {
    fn from(q: &'a TableQuery) -> Self {
        Self {
            table: &q.table,
            format: &q.format,
            value_presentation: "Code",
            variables: &q.variables,
        }
    }
}
