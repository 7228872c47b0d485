//! Query-parameter pagination resolver.
//!
//! Raw `page`/`limit`/`q`/`sort`/`order` parameters plus an endpoint-declared
//! [`PaginationConfig`] resolve into a validated [`Pagination`] value. Endpoint
//! configs are plain `const` values passed at route-registration time; there
//! is no ambient registry.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::utils::errors::AppError;

fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.and_then(|s| s.parse::<i64>().ok()))
}

/// Raw pagination query parameters as sent by the client.
///
/// Numeric fields arrive as strings in the query; empty or unparseable
/// strings count as absent, so the endpoint's defaults apply.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Free-text search query.
    pub q: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Resolved sorting, echoed back in the response envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sorting {
    pub sort_by: String,
    pub order: SortOrder,
}

/// Per-endpoint sort allow-list.
#[derive(Debug, Clone, Copy)]
pub struct SortConfig {
    pub allowed: &'static [&'static str],
    pub default_sort: &'static str,
    pub default_order: SortOrder,
}

impl SortConfig {
    fn resolve(&self, params: &PaginationParams) -> Result<Sorting, AppError> {
        let sort_by = params.sort.as_deref().unwrap_or(self.default_sort);
        if !self.allowed.contains(&sort_by) {
            return Err(AppError::bad_request(format!(
                "Invalid sort field. Allowed fields: {}",
                self.allowed.join(", ")
            )));
        }

        let order = match params.order.as_deref() {
            None => self.default_order,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "asc" => SortOrder::Asc,
                "desc" => SortOrder::Desc,
                _ => {
                    return Err(AppError::bad_request("Order must be either asc or desc"));
                }
            },
        };

        Ok(Sorting {
            sort_by: sort_by.to_string(),
            order,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Number,
    Boolean,
    Text,
    Array,
}

/// Typed constraint for one filterable query parameter.
#[derive(Debug, Clone, Copy)]
pub struct FilterRule {
    pub kind: FilterType,
    pub allowed_values: Option<&'static [&'static str]>,
}

/// A coerced filter value.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum FilterValue {
    Number(i64),
    Boolean(bool),
    Text(String),
    List(Vec<String>),
}

impl FilterValue {
    fn matches_allowed(&self, allowed: &[&str]) -> bool {
        match self {
            Self::Number(n) => allowed.contains(&n.to_string().as_str()),
            Self::Boolean(b) => allowed.contains(&if *b { "true" } else { "false" }),
            Self::Text(s) => allowed.contains(&s.as_str()),
            Self::List(items) => items.iter().all(|item| allowed.contains(&item.as_str())),
        }
    }
}

pub type FilterMap = BTreeMap<String, FilterValue>;

fn coerce(kind: FilterType, raw: &str) -> Option<FilterValue> {
    match kind {
        FilterType::Number => raw.parse::<i64>().ok().map(FilterValue::Number),
        FilterType::Boolean => Some(FilterValue::Boolean(raw == "true")),
        FilterType::Text => Some(FilterValue::Text(raw.to_string())),
        FilterType::Array => Some(FilterValue::List(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )),
    }
}

/// Per-endpoint pagination behavior, declared where the route is registered.
#[derive(Debug, Clone, Copy)]
pub struct PaginationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
    pub sort: Option<SortConfig>,
    pub filters: &'static [(&'static str, FilterRule)],
}

impl PaginationConfig {
    pub const fn new(default_limit: i64, max_limit: i64) -> Self {
        Self {
            default_limit,
            max_limit,
            sort: None,
            filters: &[],
        }
    }

    /// Validate raw query parameters into a [`Pagination`] value.
    ///
    /// Limits above `max_limit` are clamped, not rejected. Filter values that
    /// fail coercion or the allowed-values check are dropped silently.
    pub fn resolve(
        &self,
        params: &PaginationParams,
        raw: &HashMap<String, String>,
    ) -> Result<Pagination, AppError> {
        let page = params.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::bad_request("Page must be greater than 0"));
        }

        let limit = params.limit.unwrap_or(self.default_limit);
        if limit < 1 {
            return Err(AppError::bad_request("Limit must be greater than 0"));
        }
        let limit = limit.min(self.max_limit);

        let search = params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        let sorting = match &self.sort {
            Some(cfg) => Some(cfg.resolve(params)?),
            None => None,
        };

        let mut filters = FilterMap::new();
        for (key, rule) in self.filters {
            let Some(raw_value) = raw.get(*key) else {
                continue;
            };
            let Some(value) = coerce(rule.kind, raw_value) else {
                continue;
            };
            if let Some(allowed) = rule.allowed_values {
                if !value.matches_allowed(allowed) {
                    continue;
                }
            }
            filters.insert((*key).to_string(), value);
        }

        // An extreme page value can push the offset past i64; reject rather
        // than wrap.
        let offset = page
            .checked_sub(1)
            .and_then(|p| p.checked_mul(limit))
            .ok_or_else(|| AppError::bad_request("Page is out of range"))?;

        Ok(Pagination {
            page,
            limit,
            offset,
            search,
            sorting,
            filters,
        })
    }
}

/// A validated per-request pagination state, ready to parameterize queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
    pub search: Option<String>,
    pub sorting: Option<Sorting>,
    pub filters: FilterMap,
}

impl Pagination {
    /// Wrap a page slice and an independently computed total into the
    /// response envelope, echoing search/sorting/filters when present.
    pub fn envelope<T: Serialize>(&self, data: Vec<T>, total: i64) -> Paginated<T> {
        Paginated {
            data,
            pagination: PaginationMeta::new(total, self.page, self.limit),
            search: self.search.clone(),
            sorting: self.sorting.clone(),
            filters: if self.filters.is_empty() {
                None
            } else {
                Some(self.filters.clone())
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            current_page: page,
            total_pages,
            total_items: total,
            items_per_page: limit,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorting: Option<Sorting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterMap>,
}
