use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic type assigned to a whole column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Date,
    Time,
    Categorical,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Numeric => write!(f, "Numeric"),
            ColumnType::Date => write!(f, "Date"),
            ColumnType::Time => write!(f, "Time"),
            ColumnType::Categorical => write!(f, "Categorical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub inferred_type: ColumnType,
}

impl ColumnProfile {
    pub fn new(name: impl Into<String>, inferred_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            inferred_type,
        }
    }

    pub fn is(&self, column_type: ColumnType) -> bool {
        self.inferred_type == column_type
    }
}

/// Names of the profiled columns carrying `column_type`, in column order.
pub fn columns_of_type(profiles: &[ColumnProfile], column_type: ColumnType) -> Vec<&str> {
    profiles
        .iter()
        .filter(|p| p.is(column_type))
        .map(|p| p.name.as_str())
        .collect()
}
