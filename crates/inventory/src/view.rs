//! Inventory view-model: search/sort directives and the projection that turns
//! a raw record collection into the ordered sequence a table renders.

use core::cmp::Ordering;
use core::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use consign_core::{DomainError, Entity};

use crate::item::InventoryItem;

/// Column an inventory table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Sku,
    Name,
    Price,
    Quantity,
    ConsignorName,
    Status,
    DateAdded,
}

impl SortField {
    /// Table header order.
    pub const ALL: [SortField; 7] = [
        SortField::Sku,
        SortField::Name,
        SortField::Price,
        SortField::Quantity,
        SortField::ConsignorName,
        SortField::Status,
        SortField::DateAdded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Sku => "sku",
            SortField::Name => "name",
            SortField::Price => "price",
            SortField::Quantity => "quantity",
            SortField::ConsignorName => "consignorName",
            SortField::Status => "status",
            SortField::DateAdded => "dateAdded",
        }
    }
}

impl core::fmt::Display for SortField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown sort field '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(DomainError::validation(format!(
                "unknown sort direction '{other}' (expected asc or desc)"
            ))),
        }
    }
}

/// Active sort: a field (or none) plus a direction.
///
/// With `field == None` the direction is irrelevant and kept at `Asc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortDirective {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl SortDirective {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn by(field: SortField, direction: SortDirection) -> Self {
        Self {
            field: Some(field),
            direction,
        }
    }

    /// Header click on `field`.
    ///
    /// Same field cycles asc -> desc -> none; any other field starts at asc.
    pub fn select(self, field: SortField) -> Self {
        match (self.field, self.direction) {
            (Some(active), SortDirection::Asc) if active == field => {
                Self::by(field, SortDirection::Desc)
            }
            (Some(active), SortDirection::Desc) if active == field => Self::none(),
            _ => Self::by(field, SortDirection::Asc),
        }
    }

    /// Arrow to highlight on `field`'s header, if it is the active one.
    pub fn indicator(&self, field: SortField) -> Option<SortDirection> {
        (self.field == Some(field)).then_some(self.direction)
    }
}

/// Case-insensitive substring match against `sku` or `consignorName`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchDirective(String);

impl SearchDirective {
    /// Whitespace is significant: the text is not trimmed or tokenized.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let needle = self.0.to_lowercase();
        item.sku().to_lowercase().contains(&needle)
            || item.consignor_name().to_lowercase().contains(&needle)
    }
}

/// Filter then sort `items` for display. The input slice is never reordered.
///
/// Sorting is stable: items tied on the active field keep their filtered
/// order, in both directions.
pub fn project(
    items: &[InventoryItem],
    search: &SearchDirective,
    sort: SortDirective,
) -> Vec<InventoryItem> {
    let mut out: Vec<InventoryItem> = items
        .iter()
        .filter(|item| search.matches(item))
        .cloned()
        .collect();

    if let Some(field) = sort.field {
        out.sort_by(|a, b| {
            let ord = compare_by(field, a, b);
            match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    out
}

/// Items in the sales-history view (status = sold), in supplied order.
pub fn history(items: &[InventoryItem]) -> Vec<InventoryItem> {
    items.iter().filter(|item| item.is_history()).cloned().collect()
}

/// Values in `items` that `project` cannot order meaningfully on `field`.
///
/// The projection still succeeds over such values; this exists so callers can
/// surface them.
pub fn malformed_fields(items: &[InventoryItem], field: SortField) -> Vec<DomainError> {
    items
        .iter()
        .filter_map(|item| match field {
            SortField::Price if item.price().is_nan() => Some(DomainError::malformed(
                "price",
                item.id(),
                "price is not a number",
            )),
            SortField::DateAdded if parse_instant(item.date_added()).is_none() => {
                Some(DomainError::malformed(
                    "dateAdded",
                    item.id(),
                    format!("'{}' is not a timestamp", item.date_added()),
                ))
            }
            _ => None,
        })
        .collect()
}

fn compare_by(field: SortField, a: &InventoryItem, b: &InventoryItem) -> Ordering {
    match field {
        SortField::Sku => collate(a.sku(), b.sku()),
        SortField::Name => collate(a.name(), b.name()),
        SortField::ConsignorName => collate(a.consignor_name(), b.consignor_name()),
        SortField::Status => collate(a.status().as_str(), b.status().as_str()),
        // total_cmp keeps the order total when a price is NaN.
        SortField::Price => a.price().total_cmp(&b.price()),
        SortField::Quantity => a.quantity().cmp(&b.quantity()),
        // Unparseable timestamps sort before every valid one.
        SortField::DateAdded => parse_instant(a.date_added()).cmp(&parse_instant(b.date_added())),
    }
}

/// Locale-style string collation. Base letters compare first, ignoring case
/// and accents (`É` sorts with `E`); then accents (unaccented first); then
/// case, lowercase first.
fn collate(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// Lowercased base letters: NFD with combining marks dropped.
fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse a stored `dateAdded` into an instant. Accepts RFC 3339, date-times
/// without an offset and bare `YYYY-MM-DD` dates (midnight). Offset-less
/// values are read as UTC.
fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
