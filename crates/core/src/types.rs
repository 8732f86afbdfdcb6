use serde::{Deserialize, Serialize};

/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Who may read a character besides its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    /// Return the value as stored in the `visibility` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Public => "public",
        }
    }

    /// Parse a stored column value. Unknown values fall back to private.
    pub fn from_db(value: &str) -> Self {
        match value {
            "public" => Self::Public,
            _ => Self::Private,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_round_trips_through_column_value() {
        assert_eq!(Visibility::from_db(Visibility::Public.as_str()), Visibility::Public);
        assert_eq!(Visibility::from_db("garbage"), Visibility::Private);
    }
}
