//! Input records and the column fields they are sorted by.
//!
//! Records arrive either from the built-in movie list or from a JSON array on
//! disk.  Loading is all-or-nothing: the first malformed record aborts the
//! whole load with its index in the error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TableError;

const BUILTIN_MOVIES: &str = include_str!("movies.json");

// ───────────────────────────────────────── record ────────────

/// One movie as supplied by the caller.  Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub title: String,
    pub year: i32,
    pub imdb: f64,
}

#[cfg(test)]
impl Record {
    pub fn new(id: i64, title: impl Into<String>, year: i32, imdb: f64) -> Self {
        Self {
            id,
            title: title.into(),
            year,
            imdb,
        }
    }
}

/// Parse a JSON array of records, rejecting the first one that is missing a
/// field or carries a value of the wrong type.
pub fn parse_records(json: &str) -> Result<Vec<Record>, TableError> {
    let raw: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(TableError::MalformedDocument)?;

    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            let record: Record = serde_json::from_value(value)
                .map_err(|source| TableError::InvalidRecord { index, source })?;
            if !record.imdb.is_finite() {
                return Err(TableError::NonFiniteRating { index });
            }
            Ok(record)
        })
        .collect()
}

/// The movie list shipped with the binary.
pub fn builtin_records() -> Result<Vec<Record>, TableError> {
    parse_records(BUILTIN_MOVIES)
}

// ───────────────────────────────────────── field ─────────────

/// A sortable column.  Declaration order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Title,
    Year,
    Imdb,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Id, Field::Title, Field::Year, Field::Imdb];

    /// Header label, also used as the column's class name in HTML output.
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Year => "year",
            Field::Imdb => "imdb",
        }
    }

    /// Column position in [`Field::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| TableError::UnknownField(s.to_string()))
    }
}

// ───────────────────────────────────────── direction ─────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl FromStr for SortDirection {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "up" => Ok(SortDirection::Ascending),
            "desc" | "down" => Ok(SortDirection::Descending),
            other => Err(TableError::UnknownDirection(other.to_string())),
        }
    }
}

/// A `field[:asc|:desc]` pair as given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: Field,
    pub direction: SortDirection,
}

impl FromStr for SortSpec {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, dir)) => (field.parse()?, dir.parse()?),
            None => (s.parse()?, SortDirection::Ascending),
        };
        Ok(Self { field, direction })
    }
}
