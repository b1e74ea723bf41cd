//! Filter predicates.

use crate::types::Toy;
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// Three-valued stock filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StockFilter {
    #[default]
    All,
    InStock,
    OutOfStock,
}

impl StockFilter {
    fn matches(self, in_stock: bool) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::InStock => in_stock,
            StockFilter::OutOfStock => !in_stock,
        }
    }
}

impl From<Option<bool>> for StockFilter {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => StockFilter::InStock,
            Some(false) => StockFilter::OutOfStock,
            None => StockFilter::All,
        }
    }
}

/// How a requested label set is matched against a toy's labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LabelMatch {
    /// Toy must carry every requested label.
    #[default]
    All,
    /// Toy must carry at least one requested label.
    Any,
}

/// Filter criteria. Active criteria combine with AND.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToyFilter {
    /// Case-insensitive pattern matched against the name. Blank matches all.
    pub txt: String,
    pub stock: StockFilter,
    /// Empty means no label filtering.
    pub labels: Vec<String>,
    pub label_match: LabelMatch,
}

impl ToyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, txt: impl Into<String>) -> Self {
        self.txt = txt.into();
        self
    }

    pub fn stock(mut self, stock: StockFilter) -> Self {
        self.stock = stock;
        self
    }

    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn label_match(mut self, mode: LabelMatch) -> Self {
        self.label_match = mode;
        self
    }

    /// Prepare the filter for repeated matching.
    pub(crate) fn compile(&self) -> CompiledFilter<'_> {
        let pattern = self.txt.trim();
        let name = if pattern.is_empty() {
            None
        } else {
            Some(compile_pattern(pattern))
        };

        CompiledFilter { filter: self, name }
    }

    /// Test a single toy against this filter.
    pub fn matches(&self, toy: &Toy) -> bool {
        self.compile().matches(toy)
    }
}

/// Name matcher. Patterns that fail to compile are matched literally.
enum NameMatcher {
    Pattern(Regex),
    Literal(String),
}

impl NameMatcher {
    fn is_match(&self, name: &str) -> bool {
        match self {
            NameMatcher::Pattern(re) => re.is_match(name),
            NameMatcher::Literal(needle) => name.to_lowercase().contains(needle.as_str()),
        }
    }
}

fn compile_pattern(pattern: &str) -> NameMatcher {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => NameMatcher::Pattern(re),
        Err(e) => {
            warn!(pattern, error = %e, "invalid name pattern, matching literally");
            NameMatcher::Literal(pattern.to_lowercase())
        }
    }
}

pub(crate) struct CompiledFilter<'a> {
    filter: &'a ToyFilter,
    name: Option<NameMatcher>,
}

impl CompiledFilter<'_> {
    pub(crate) fn matches(&self, toy: &Toy) -> bool {
        if let Some(name) = &self.name {
            if !name.is_match(&toy.name) {
                return false;
            }
        }

        if !self.filter.stock.matches(toy.in_stock) {
            return false;
        }

        let wanted = &self.filter.labels;
        if !wanted.is_empty() {
            let ok = match self.filter.label_match {
                LabelMatch::All => wanted.iter().all(|l| toy.has_label(l)),
                LabelMatch::Any => wanted.iter().any(|l| toy.has_label(l)),
            };
            if !ok {
                return false;
            }
        }

        true
    }
}
