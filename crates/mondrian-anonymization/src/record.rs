use std::{collections::HashMap, fmt};

pub type RecordId = u64;

/// A quasi-identifier value as it appears in the input.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Numeric(f64),
    Categorical(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Numeric(value) => write!(f, "{}", value),
            Value::Categorical(value) => f.write_str(value),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Numeric(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Numeric(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Numeric(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Categorical(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Categorical(value)
    }
}

/// One input row: quasi-identifiers by column name and sensitive attributes
/// that are passed through untouched. A `None` sensitive value is a null in
/// the source table and stays null in the output.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub quasi_identifiers: HashMap<String, Value>,
    pub sensitive: HashMap<String, Option<String>>,
}

impl Record {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            quasi_identifiers: HashMap::new(),
            sensitive: HashMap::new(),
        }
    }

    pub fn with_quasi_identifier(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.quasi_identifiers.insert(column.into(), value.into());
        self
    }

    pub fn with_sensitive(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.sensitive.insert(column.into(), Some(value.into()));
        self
    }

    pub fn with_null_sensitive(mut self, column: impl Into<String>) -> Self {
        self.sensitive.insert(column.into(), None);
        self
    }
}
