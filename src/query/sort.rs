//! Sort keys and comparators.

use crate::error::StoreError;
use crate::types::Toy;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The field a result set is ordered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    Price,
    CreatedAt,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::CreatedAt => "createdAt",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortField::Name),
            "price" => Ok(SortField::Price),
            "createdAt" | "created_at" => Ok(SortField::CreatedAt),
            other => Err(StoreError::InvalidSortKey(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Sort specification: one field, one direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SortBy {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortBy {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortOrder::Desc)
    }

    /// Compare two toys. Equal keys compare `Equal` in both directions.
    pub fn compare(&self, a: &Toy, b: &Toy) -> Ordering {
        let ord = match self.field {
            SortField::Name => compare_names(&a.name, &b.name),
            SortField::Price => a.price.total_cmp(&b.price),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };

        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// Locale-style name collation.
///
/// Primary comparison ignores case; on a case-only difference lowercase
/// sorts first ("ball" < "Ball" < "bat").
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);

    folded_a.cmp(folded_b).then_with(|| b.cmp(a))
}
