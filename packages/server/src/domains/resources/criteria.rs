//! Filter criteria parsing.
//!
//! Callers hand over a loose key → value map. Parsing sorts each key into
//! one of three classes: scalar columns (exact match), tag categories
//! (any-of within the category) or `location` (descendant expansion). Keys
//! outside those classes are dropped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::models::{parse_tag_list, Resource, TagCategory};

pub const LOCATION_KEY: &str = "location";
pub const SORT_KEY: &str = "sort_by";

/// A single criterion value as it arrives from a loosely-typed caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriterionValue {
    Number(i64),
    Text(String),
    List(Vec<String>),
    /// Anything else a loose caller sends: `true`, `null`, `1.5`, objects
    Other(serde_json::Value),
}

impl CriterionValue {
    /// Tag values requested by this criterion
    pub fn as_list(&self) -> Vec<String> {
        match self {
            CriterionValue::Number(n) => vec![n.to_string()],
            CriterionValue::Text(raw) => parse_tag_list(raw),
            CriterionValue::List(values) => values
                .iter()
                .flat_map(|value| parse_tag_list(value))
                .collect(),
            CriterionValue::Other(_) => Vec::new(),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            CriterionValue::Number(n) => n.to_string(),
            CriterionValue::Text(raw) => raw.clone(),
            CriterionValue::List(values) => values.join(","),
            CriterionValue::Other(value) => value.to_string(),
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            CriterionValue::Number(n) => i32::try_from(*n).ok(),
            CriterionValue::Text(raw) => raw.trim().parse().ok(),
            CriterionValue::List(_) => None,
            CriterionValue::Other(value) => value
                .as_f64()
                .filter(|n| n.fract() == 0.0)
                .and_then(|n| i32::try_from(n as i64).ok()),
        }
    }

    /// JSON `null`, treated as if the key were absent
    pub fn is_null(&self) -> bool {
        matches!(self, CriterionValue::Other(serde_json::Value::Null))
    }
}

impl From<&str> for CriterionValue {
    fn from(value: &str) -> Self {
        CriterionValue::Text(value.to_string())
    }
}

impl From<String> for CriterionValue {
    fn from(value: String) -> Self {
        CriterionValue::Text(value)
    }
}

impl From<i64> for CriterionValue {
    fn from(value: i64) -> Self {
        CriterionValue::Number(value)
    }
}

impl From<i32> for CriterionValue {
    fn from(value: i32) -> Self {
        CriterionValue::Number(value.into())
    }
}

impl From<Vec<String>> for CriterionValue {
    fn from(values: Vec<String>) -> Self {
        CriterionValue::List(values)
    }
}

/// Named filter criteria, e.g. `{"types": "Scholarship,Funding", "flagged": 1}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterCriteria(BTreeMap<String, CriterionValue>);

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<CriterionValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&CriterionValue> {
        self.0.get(key)
    }

    pub fn location(&self) -> Option<String> {
        self.get(LOCATION_KEY)
            .filter(|value| !value.is_null())
            .map(CriterionValue::as_text)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CriterionValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<CriterionValue>> FromIterator<(K, V)> for FilterCriteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Resource columns that accept an exact-match criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarColumn {
    Title,
    Url,
    ContactEmail,
    Description,
    ApprovalStatus,
    Flagged,
    ApprovalNum,
    BrokenNum,
}

impl ScalarColumn {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "title" => Some(ScalarColumn::Title),
            "url" => Some(ScalarColumn::Url),
            "contact_email" => Some(ScalarColumn::ContactEmail),
            "description" => Some(ScalarColumn::Description),
            "approval_status" => Some(ScalarColumn::ApprovalStatus),
            "flagged" => Some(ScalarColumn::Flagged),
            "approval_num" => Some(ScalarColumn::ApprovalNum),
            "broken_num" => Some(ScalarColumn::BrokenNum),
            _ => None,
        }
    }

    /// Column name; only ever interpolated from this fixed set
    pub fn column(self) -> &'static str {
        match self {
            ScalarColumn::Title => "title",
            ScalarColumn::Url => "url",
            ScalarColumn::ContactEmail => "contact_email",
            ScalarColumn::Description => "description",
            ScalarColumn::ApprovalStatus => "approval_status",
            ScalarColumn::Flagged => "flagged",
            ScalarColumn::ApprovalNum => "approval_num",
            ScalarColumn::BrokenNum => "broken_num",
        }
    }

    fn is_integer(self) -> bool {
        matches!(
            self,
            ScalarColumn::ApprovalStatus
                | ScalarColumn::Flagged
                | ScalarColumn::ApprovalNum
                | ScalarColumn::BrokenNum
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarValue {
    Text(String),
    Int(i32),
}

/// `column = value`, already coerced to the column's type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarFilter {
    pub column: ScalarColumn,
    pub value: ScalarValue,
}

impl ScalarFilter {
    pub fn matches(&self, resource: &Resource) -> bool {
        match (&self.value, self.column) {
            (ScalarValue::Text(v), ScalarColumn::Title) => resource.title == *v,
            (ScalarValue::Text(v), ScalarColumn::Url) => resource.url == *v,
            (ScalarValue::Text(v), ScalarColumn::ContactEmail) => resource.contact_email == *v,
            (ScalarValue::Text(v), ScalarColumn::Description) => {
                resource.description.as_deref() == Some(v.as_str())
            }
            (ScalarValue::Int(v), ScalarColumn::ApprovalStatus) => resource.approval_status == *v,
            (ScalarValue::Int(v), ScalarColumn::Flagged) => resource.flagged == *v,
            (ScalarValue::Int(v), ScalarColumn::ApprovalNum) => resource.approval_num == *v,
            (ScalarValue::Int(v), ScalarColumn::BrokenNum) => resource.broken_num == *v,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub field: SortField,
    pub descending: bool,
}

impl SortOrder {
    /// `"title"`, `"-created_at"`, ...
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = match name {
            "title" => SortField::Title,
            "created_at" => SortField::CreatedAt,
            "updated_at" => SortField::UpdatedAt,
            _ => return None,
        };
        Some(Self { field, descending })
    }

    pub fn apply(&self, resources: &mut [Resource]) {
        match self.field {
            SortField::Title => resources.sort_by(|a, b| a.title.cmp(&b.title)),
            SortField::CreatedAt => resources.sort_by_key(|r| (r.created_at, r.id)),
            SortField::UpdatedAt => resources.sort_by_key(|r| (r.updated_at, r.id)),
        }
        if self.descending {
            resources.reverse();
        }
    }
}

/// Criteria sorted into their classes
#[derive(Debug, Clone, Default)]
pub struct ResourceQuery {
    pub scalars: Vec<ScalarFilter>,
    pub tags: Vec<(TagCategory, Vec<String>)>,
    pub location: Option<String>,
    pub sort: Option<SortOrder>,
    /// A scalar value could not be coerced to its column type
    pub unsatisfiable: bool,
}

impl ResourceQuery {
    pub fn parse(criteria: &FilterCriteria) -> Self {
        let mut query = ResourceQuery::default();

        for (key, value) in criteria.iter() {
            if value.is_null() {
                debug!(key = %key, "Ignoring null criterion");
            } else if key == LOCATION_KEY {
                query.location = Some(value.as_text());
            } else if key == SORT_KEY {
                query.sort = SortOrder::parse(&value.as_text());
                if query.sort.is_none() {
                    debug!(value = ?value, "Ignoring unsupported sort order");
                }
            } else if let Some(category) = TagCategory::from_key(key) {
                let values = value.as_list();
                if !values.is_empty() {
                    query.tags.push((category, values));
                }
            } else if let Some(column) = ScalarColumn::from_key(key) {
                if column.is_integer() {
                    match value.as_int() {
                        Some(n) => query.scalars.push(ScalarFilter {
                            column,
                            value: ScalarValue::Int(n),
                        }),
                        None => {
                            debug!(key = %key, value = ?value, "Criterion value is not an integer");
                            query.unsatisfiable = true;
                        }
                    }
                } else {
                    query.scalars.push(ScalarFilter {
                        column,
                        value: ScalarValue::Text(value.as_text()),
                    });
                }
            } else {
                debug!(key = %key, "Ignoring unknown filter key");
            }
        }

        query
    }

    /// No criterion narrows the result
    pub fn is_unconstrained(&self) -> bool {
        self.scalars.is_empty() && self.tags.is_empty() && self.location.is_none() && !self.unsatisfiable
    }
}
