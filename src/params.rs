//! Translation of raw list-request parameters into typed query values.
//!
//! Transports hand over strings (`filterBy[inStock]=true`, `pageIdx=2`,
//! ...). This module owns the defaults and the leniency rules so every
//! transport reads them the same way.

use crate::error::Result;
use crate::query::{LabelMatch, SortBy, SortField, SortOrder, StockFilter, ToyFilter};
use serde::de::{Deserializer, IgnoredAny};
use serde::Deserialize;

/// `filterBy` group of a list request.
///
/// Scalars arrive as strings from a query string and as numbers or booleans
/// from a JSON body; both are read as their string form. Values of any other
/// shape are treated as absent.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    #[serde(default, deserialize_with = "lenient_string")]
    pub txt: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub in_stock: Option<String>,
    /// A single scalar reads as a one-item list.
    #[serde(default, deserialize_with = "lenient_list")]
    pub labels: Vec<String>,
}

/// `sortBy` group of a list request.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SortParams {
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub field: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub desc: Option<String>,
}

/// A list request as received from a transport.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub filter_by: FilterParams,
    #[serde(default)]
    pub sort_by: SortParams,
    #[serde(default, deserialize_with = "lenient_string")]
    pub page_idx: Option<String>,
}

/// Any single request value.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Other(IgnoredAny),
}

impl Scalar {
    fn into_string(self) -> Option<String> {
        match self {
            Scalar::Str(s) => Some(s),
            Scalar::Int(n) => Some(n.to_string()),
            Scalar::Float(n) => Some(n.to_string()),
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Other(_) => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarList {
    Many(Vec<Scalar>),
    One(Scalar),
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.and_then(Scalar::into_string))
}

fn lenient_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match ScalarList::deserialize(deserializer)? {
        ScalarList::Many(values) => values.into_iter().filter_map(Scalar::into_string).collect(),
        ScalarList::One(value) => value.into_string().into_iter().collect(),
    };
    Ok(values)
}

/// Typed form of a [`ListParams`].
#[derive(Clone, Debug, PartialEq)]
pub struct ListQuery {
    pub filter: ToyFilter,
    pub sort: SortBy,
    pub page_index: usize,
}

impl ListParams {
    /// Resolve the request. Only an unknown sort key is an error.
    pub fn resolve(&self) -> Result<ListQuery> {
        Ok(ListQuery {
            filter: self.filter_by.resolve(),
            sort: self.sort_by.resolve()?,
            page_index: parse_page_index(self.page_idx.as_deref()),
        })
    }
}

impl FilterParams {
    pub fn resolve(&self) -> ToyFilter {
        let labels = self
            .labels
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();

        ToyFilter {
            txt: self.txt.clone().unwrap_or_default(),
            stock: parse_stock(self.in_stock.as_deref()),
            labels,
            label_match: LabelMatch::All,
        }
    }
}

impl SortParams {
    pub fn resolve(&self) -> Result<SortBy> {
        let field = match self.field.as_deref().map(str::trim) {
            None | Some("") => SortField::default(),
            Some(raw) => raw.parse()?,
        };
        let order = match self.desc.as_deref().map(str::trim) {
            Some("-1") | Some("true") | Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        };
        Ok(SortBy::new(field, order))
    }
}

/// `"true"` and `"false"` select a stock state; anything else means all.
pub fn parse_stock(raw: Option<&str>) -> StockFilter {
    match raw.map(str::trim) {
        Some("true") => StockFilter::InStock,
        Some("false") => StockFilter::OutOfStock,
        _ => StockFilter::All,
    }
}

/// Read the leading integer of `raw`, ignoring anything after it
/// (`"2abc"` and `"3.7"` give 2 and 3).
///
/// Negative, missing, or non-numeric page indices read as zero.
pub fn parse_page_index(raw: Option<&str>) -> usize {
    let Some(s) = raw.map(str::trim_start) else {
        return 0;
    };
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];

    if negative || digits.is_empty() {
        return 0;
    }
    digits.parse::<usize>().unwrap_or(usize::MAX)
}
