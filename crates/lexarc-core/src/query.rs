//! # Query Types
//!
//! Structured filter, sort and pagination types, plus the predicate
//! matching rules they obey. Execution lives in `engine`.
//!
//! All predicates are conjunctive. A record whose field is absent never
//! matches a predicate on that field, whatever the operator.

use crate::primitives::FUZZY_MAX_DISTANCE;
use crate::types::{FieldValue, LexarcError};
use std::cmp::Ordering;

// =============================================================================
// OPERATORS
// =============================================================================

/// Filter operators supported by the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Between,
    InSet,
    NotInSet,
    Regex,
    Fuzzy,
}

impl FilterOp {
    /// Stable textual name, as accepted by the CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FilterOp::Equals => "eq",
            FilterOp::Contains => "contains",
            FilterOp::StartsWith => "starts_with",
            FilterOp::EndsWith => "ends_with",
            FilterOp::GreaterThan => "gt",
            FilterOp::LessThan => "lt",
            FilterOp::GreaterOrEqual => "gte",
            FilterOp::LessOrEqual => "lte",
            FilterOp::Between => "between",
            FilterOp::InSet => "in",
            FilterOp::NotInSet => "not_in",
            FilterOp::Regex => "regex",
            FilterOp::Fuzzy => "fuzzy",
        }
    }

    /// Resolve a textual operator name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            FilterOp::Equals,
            FilterOp::Contains,
            FilterOp::StartsWith,
            FilterOp::EndsWith,
            FilterOp::GreaterThan,
            FilterOp::LessThan,
            FilterOp::GreaterOrEqual,
            FilterOp::LessOrEqual,
            FilterOp::Between,
            FilterOp::InSet,
            FilterOp::NotInSet,
            FilterOp::Regex,
            FilterOp::Fuzzy,
        ]
        .into_iter()
        .find(|op| op.as_str() == name)
    }
}

/// The value side of a filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// One scalar, for every operator except Between/InSet/NotInSet.
    Scalar(FieldValue),
    /// Inclusive range, for Between.
    Range(FieldValue, FieldValue),
    /// Value set, for InSet/NotInSet.
    Set(Vec<FieldValue>),
}

/// One filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: FilterValue,
}

impl Filter {
    /// Build a predicate.
    #[must_use]
    pub fn new(field: impl Into<String>, op: FilterOp, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Convenience equality predicate.
    #[must_use]
    pub fn equals(field: impl Into<String>, value: FieldValue) -> Self {
        Self::new(field, FilterOp::Equals, FilterValue::Scalar(value))
    }
}

// =============================================================================
// SORT & PAGINATION
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Optional sort specification. Ties always break by identity ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

/// A complete query: conjunctive filters, optional sort, pagination.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub filters: Vec<Filter>,
    pub sort: Option<SortSpec>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl SearchQuery {
    /// Start an empty query (matches everything, unsorted, unpaginated).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter predicate.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the sort field and direction.
    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(SortSpec {
            field: field.into(),
            order,
        });
        self
    }

    /// Set pagination.
    #[must_use]
    pub fn paginate(mut self, offset: usize, limit: Option<usize>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}

// =============================================================================
// PREPARED FILTERS
// =============================================================================

/// A filter validated against its operator, with its regex compiled once.
#[derive(Debug)]
pub(crate) struct PreparedFilter<'a> {
    pub(crate) filter: &'a Filter,
    regex: Option<regex::Regex>,
}

/// Validate operator/value combinations and compile regular expressions.
pub(crate) fn prepare(filters: &[Filter]) -> Result<Vec<PreparedFilter<'_>>, LexarcError> {
    filters
        .iter()
        .map(|filter| {
            let regex = match (filter.op, &filter.value) {
                (FilterOp::Between, FilterValue::Range(_, _)) => None,
                (FilterOp::Between, _) => {
                    return Err(LexarcError::QueryError(format!(
                        "operator '{}' requires a range value",
                        filter.op.as_str()
                    )));
                }
                (FilterOp::InSet | FilterOp::NotInSet, FilterValue::Set(_)) => None,
                (FilterOp::InSet | FilterOp::NotInSet, _) => {
                    return Err(LexarcError::QueryError(format!(
                        "operator '{}' requires a value set",
                        filter.op.as_str()
                    )));
                }
                (FilterOp::Regex, FilterValue::Scalar(FieldValue::Str(pattern))) => Some(
                    regex::Regex::new(pattern)
                        .map_err(|e| LexarcError::QueryError(e.to_string()))?,
                ),
                (FilterOp::Regex, _) => {
                    return Err(LexarcError::QueryError(
                        "operator 'regex' requires a string pattern".to_string(),
                    ));
                }
                (_, FilterValue::Scalar(_)) => None,
                (op, _) => {
                    return Err(LexarcError::QueryError(format!(
                        "operator '{}' requires a single scalar value",
                        op.as_str()
                    )));
                }
            };
            Ok(PreparedFilter { filter, regex })
        })
        .collect()
}

impl PreparedFilter<'_> {
    /// Whether a record's field value satisfies this predicate.
    ///
    /// Absent fields never match.
    pub(crate) fn matches(&self, actual: Option<&FieldValue>) -> bool {
        let Some(actual) = actual else {
            return false;
        };

        match (&self.filter.op, &self.filter.value) {
            (FilterOp::Equals, FilterValue::Scalar(expected)) => {
                compare_values(actual, expected) == Some(Ordering::Equal)
            }
            (FilterOp::Contains, FilterValue::Scalar(expected)) => {
                actual.index_key().contains(&expected.index_key())
            }
            (FilterOp::StartsWith, FilterValue::Scalar(expected)) => {
                actual.index_key().starts_with(&expected.index_key())
            }
            (FilterOp::EndsWith, FilterValue::Scalar(expected)) => {
                actual.index_key().ends_with(&expected.index_key())
            }
            (FilterOp::GreaterThan, FilterValue::Scalar(expected)) => {
                compare_values(actual, expected) == Some(Ordering::Greater)
            }
            (FilterOp::LessThan, FilterValue::Scalar(expected)) => {
                compare_values(actual, expected) == Some(Ordering::Less)
            }
            (FilterOp::GreaterOrEqual, FilterValue::Scalar(expected)) => matches!(
                compare_values(actual, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            (FilterOp::LessOrEqual, FilterValue::Scalar(expected)) => matches!(
                compare_values(actual, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            (FilterOp::Between, FilterValue::Range(low, high)) => {
                matches!(
                    compare_values(actual, low),
                    Some(Ordering::Greater | Ordering::Equal)
                ) && matches!(
                    compare_values(actual, high),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }
            (FilterOp::InSet, FilterValue::Set(values)) => values
                .iter()
                .any(|v| compare_values(actual, v) == Some(Ordering::Equal)),
            (FilterOp::NotInSet, FilterValue::Set(values)) => !values
                .iter()
                .any(|v| compare_values(actual, v) == Some(Ordering::Equal)),
            (FilterOp::Regex, FilterValue::Scalar(_)) => self
                .regex
                .as_ref()
                .is_some_and(|re| re.is_match(&actual.index_key())),
            (FilterOp::Fuzzy, FilterValue::Scalar(expected)) => fuzzy_match(
                &actual.index_key().to_lowercase(),
                &expected.index_key().to_lowercase(),
            ),
            // prepare() rejects every other combination.
            _ => false,
        }
    }
}

// =============================================================================
// VALUE COMPARISON
// =============================================================================

/// Compare two field values with numeric and date/timestamp coercion.
///
/// `None` means the values are not comparable (mixed, unrelated types);
/// incomparable pairs never satisfy an operator.
#[must_use]
pub fn compare_values(a: &FieldValue, b: &FieldValue) -> Option<Ordering> {
    match (a, b) {
        (FieldValue::Str(x), FieldValue::Str(y)) => Some(x.cmp(y)),
        (FieldValue::Int(x), FieldValue::Int(y)) => Some(x.cmp(y)),
        (FieldValue::Bool(x), FieldValue::Bool(y)) => Some(x.cmp(y)),
        (FieldValue::Float(x), FieldValue::Float(y)) => x.partial_cmp(y),
        (FieldValue::Int(x), FieldValue::Float(y)) => (*x as f64).partial_cmp(y),
        (FieldValue::Float(x), FieldValue::Int(y)) => x.partial_cmp(&(*y as f64)),
        (FieldValue::Date(x), FieldValue::Date(y)) => Some(x.cmp(y)),
        (FieldValue::Timestamp(x), FieldValue::Timestamp(y)) => Some(x.cmp(y)),
        (FieldValue::Date(x), FieldValue::Timestamp(y)) => {
            x.and_hms_opt(0, 0, 0).map(|ts| ts.cmp(y))
        }
        (FieldValue::Timestamp(x), FieldValue::Date(y)) => {
            y.and_hms_opt(0, 0, 0).map(|ts| x.cmp(&ts))
        }
        _ => None,
    }
}

// =============================================================================
// FUZZY MATCHING
// =============================================================================

/// Bounded-distance fuzzy match.
fn fuzzy_match(text: &str, pattern: &str) -> bool {
    if text.chars().count().abs_diff(pattern.chars().count()) > FUZZY_MAX_DISTANCE {
        return false;
    }
    levenshtein_distance(text, pattern) <= FUZZY_MAX_DISTANCE
}

/// Levenshtein edit distance between two strings.
///
/// Two-row dynamic program; O(len(a) * len(b)) time, O(len(b)) space.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

// =============================================================================
// TESTS
// =============================================================================
