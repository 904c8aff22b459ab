//! Query Builder
//!
//! Turns raw request parameters into a [`ProductQuery`]: a validated
//! description of filter, sort and page that only repositories interpret.
//! Nothing here touches the store.

use std::collections::HashMap;
use std::str::FromStr;
use strum::{Display, EnumString};

use crate::error::{ProductError, ProductResult};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;
/// Highest page number kept; larger requests land on an empty page past the
/// end while the offset still fits the store's signed 64-bit skip
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_LIMIT;

/// Fields that may be matched exactly through the general query endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum FilterField {
    Title,
    Description,
    Category,
    Owner,
    Price,
    Stock,
    Published,
}

/// Fields a listing may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum SortField {
    Title,
    Price,
    Category,
    Stock,
    Published,
    CreatedAt,
    /// Store identifier; used for stable pagination
    #[strum(disabled)]
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Descending only for exactly `"desc"`
    pub fn from_order(order: Option<&str>) -> Self {
        match order {
            Some("desc") => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }
}

/// Typed comparison value for an exact-match filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Integer(i64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// `field == value`
    Equals(FilterField, FilterValue),
    /// Case-insensitive substring of title or description; the term is
    /// matched literally
    Search(String),
    /// Inclusive price bounds; `None` leaves that side open
    PriceRange { min: Option<f64>, max: Option<f64> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based
    pub number: u64,
    pub limit: u64,
}

impl Page {
    pub fn skip(&self) -> u64 {
        self.number.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Validated query descriptor; all criteria must hold (logical AND)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductQuery {
    criteria: Vec<Criterion>,
    sort: Option<SortSpec>,
    page: Option<Page>,
}

impl ProductQuery {
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn page(&self) -> Option<Page> {
        self.page
    }

    /// Requested ordering. Paginated queries without one are ordered by id so
    /// consecutive pages neither overlap nor skip records.
    pub fn sort(&self) -> Option<SortSpec> {
        match (self.sort, self.page) {
            (Some(sort), _) => Some(sort),
            (None, Some(_)) => Some(SortSpec {
                field: SortField::Id,
                direction: SortDirection::Ascending,
            }),
            (None, None) => None,
        }
    }
}

/// Builds a [`ProductQuery`] step by step.
///
/// ```ignore
/// let query = QueryBuilder::new()
///     .search(Some("grinder"))
///     .price_range(Some("10"), Some("250"))?
///     .sort(Some("price"), Some("desc"))?
///     .paginate(Some("2"), Some("20"))
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct QueryBuilder {
    query: ProductQuery,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// General query endpoint: reserved keys go to their dedicated builder,
    /// every other key must be an allow-listed field with a well-typed value.
    pub fn from_params(params: &HashMap<String, String>) -> ProductResult<Self> {
        let get = |key: &str| params.get(key).map(String::as_str);

        let mut builder = Self::new()
            .search(get("search"))
            .price_range(get("minPrice"), get("maxPrice"))?;

        if get("sortBy").is_some() || get("order").is_some() {
            builder = builder.sort(get("sortBy"), get("order"))?;
        }
        if get("page").is_some() || get("limit").is_some() {
            builder = builder.paginate(get("page"), get("limit"));
        }

        let mut filters: Vec<(&String, &String)> = params
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .collect();
        // HashMap order is random; keep the descriptor deterministic
        filters.sort();

        for (key, value) in filters {
            builder = builder.filter(key, value)?;
        }

        Ok(builder)
    }

    /// Exact match on an allow-listed field
    pub fn filter(mut self, key: &str, value: &str) -> ProductResult<Self> {
        let field = FilterField::from_str(key)
            .map_err(|_| ProductError::InvalidArgument(format!("Unknown filter field '{}'", key)))?;
        let value = parse_filter_value(field, value)?;
        self.query.criteria.push(Criterion::Equals(field, value));
        Ok(self)
    }

    /// Required, non-blank category
    pub fn category(mut self, category: Option<&str>) -> ProductResult<Self> {
        let category = category.map(str::trim).unwrap_or_default();
        if category.is_empty() {
            return Err(ProductError::InvalidArgument(
                "Query parameter 'category' is required".to_string(),
            ));
        }
        self.query.criteria.push(Criterion::Equals(
            FilterField::Category,
            FilterValue::Text(category.to_string()),
        ));
        Ok(self)
    }

    /// Free-text search; blank or absent adds no constraint
    pub fn search(mut self, term: Option<&str>) -> Self {
        if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
            self.query.criteria.push(Criterion::Search(term.to_string()));
        }
        self
    }

    pub fn price_range(mut self, min: Option<&str>, max: Option<&str>) -> ProductResult<Self> {
        let min = parse_price_bound("minPrice", min)?;
        let max = parse_price_bound("maxPrice", max)?;

        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(ProductError::InvalidArgument(format!(
                    "minPrice ({}) must not exceed maxPrice ({})",
                    lo, hi
                )));
            }
        }

        if min.is_some() || max.is_some() {
            self.query.criteria.push(Criterion::PriceRange { min, max });
        }
        Ok(self)
    }

    /// Order by `sort_by` (default `createdAt`)
    pub fn sort(mut self, sort_by: Option<&str>, order: Option<&str>) -> ProductResult<Self> {
        let field = match sort_by.map(str::trim).filter(|s| !s.is_empty()) {
            None => SortField::CreatedAt,
            Some(name) => SortField::from_str(name).map_err(|_| {
                ProductError::InvalidArgument(format!("Cannot sort by '{}'", name))
            })?,
        };

        self.query.sort = Some(SortSpec {
            field,
            direction: SortDirection::from_order(order),
        });
        Ok(self)
    }

    /// Never fails: unusable values fall back to the defaults
    pub fn paginate(mut self, page: Option<&str>, limit: Option<&str>) -> Self {
        let number = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .map(|p| (p.max(1) as u64).min(MAX_PAGE))
            .unwrap_or(DEFAULT_PAGE);

        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .map(|l| (l as u64).min(MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);

        self.query.page = Some(Page { number, limit });
        self
    }

    pub fn build(self) -> ProductQuery {
        self.query
    }
}

const RESERVED_KEYS: [&str; 7] = [
    "search", "minPrice", "maxPrice", "sortBy", "order", "page", "limit",
];

fn parse_filter_value(field: FilterField, raw: &str) -> ProductResult<FilterValue> {
    let invalid = |expected: &str| {
        ProductError::InvalidArgument(format!(
            "Filter '{}' expects {}, got '{}'",
            field, expected, raw
        ))
    };

    match field {
        FilterField::Price => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(FilterValue::Number)
            .ok_or_else(|| invalid("a number")),
        FilterField::Stock => raw
            .trim()
            .parse::<i64>()
            .map(FilterValue::Integer)
            .map_err(|_| invalid("an integer")),
        FilterField::Published => match raw.trim() {
            "true" => Ok(FilterValue::Bool(true)),
            "false" => Ok(FilterValue::Bool(false)),
            _ => Err(invalid("true or false")),
        },
        FilterField::Title | FilterField::Description | FilterField::Category | FilterField::Owner => {
            Ok(FilterValue::Text(raw.to_string()))
        }
    }
}

fn parse_price_bound(name: &str, raw: Option<&str>) -> ProductResult<Option<f64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| {
                ProductError::InvalidArgument(format!("{} must be a number, got '{}'", name, s))
            }),
    }
}
