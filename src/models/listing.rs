//! Book listing query: reserved parameters, lookup filters, ordering and
//! page arithmetic.
//!
//! Everything here is pure. A request's query pairs are turned into a
//! [`ListQuery`] and the store's row count into a [`PageWindow`]; the
//! repository turns filters and ordering into SQL.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::book::{BookJson, DATE_FORMAT};
use crate::error::{AppError, AppResult};

pub const PARAM_ALL: &str = "all";
pub const PARAM_PAGE_SIZE: &str = "pageSize";
pub const PARAM_PAGE: &str = "page";
pub const PARAM_ORDER_BY: &str = "orderBy";

pub const DEFAULT_PAGE: i64 = 1;

/// Separates a field name from its lookup, as in `title__icontains`
const LOOKUP_SEPARATOR: &str = "__";

/// Most items an `in` lookup may list; each item is one bind parameter
pub const MAX_IN_ITEMS: usize = 1000;

/// Filterable and orderable book columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Id,
    Title,
    Author,
    Description,
    Picture,
    DatePublished,
    CheckedOut,
    DateCheckedOut,
}

/// Value domain of a column, deciding which lookups apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Date,
    Boolean,
}

impl BookField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" | "pk" => Some(BookField::Id),
            "title" => Some(BookField::Title),
            "author" => Some(BookField::Author),
            "description" => Some(BookField::Description),
            "picture" => Some(BookField::Picture),
            "date_published" => Some(BookField::DatePublished),
            "checked_out" => Some(BookField::CheckedOut),
            "date_checked_out" => Some(BookField::DateCheckedOut),
            _ => None,
        }
    }

    /// Column name in the `books` table
    pub fn column(&self) -> &'static str {
        match self {
            BookField::Id => "id",
            BookField::Title => "title",
            BookField::Author => "author",
            BookField::Description => "description",
            BookField::Picture => "picture",
            BookField::DatePublished => "date_published",
            BookField::CheckedOut => "checked_out",
            BookField::DateCheckedOut => "date_checked_out",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            BookField::Id => FieldKind::Integer,
            BookField::Title | BookField::Author | BookField::Description | BookField::Picture => {
                FieldKind::Text
            }
            BookField::DatePublished | BookField::DateCheckedOut => FieldKind::Date,
            BookField::CheckedOut => FieldKind::Boolean,
        }
    }
}

/// Comparison applied by a lookup filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Exact,
    IExact,
    Contains,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    IsNull,
}

impl Lookup {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "exact" => Some(Lookup::Exact),
            "iexact" => Some(Lookup::IExact),
            "contains" => Some(Lookup::Contains),
            "icontains" => Some(Lookup::IContains),
            "startswith" => Some(Lookup::StartsWith),
            "istartswith" => Some(Lookup::IStartsWith),
            "endswith" => Some(Lookup::EndsWith),
            "iendswith" => Some(Lookup::IEndsWith),
            "gt" => Some(Lookup::Gt),
            "gte" => Some(Lookup::Gte),
            "lt" => Some(Lookup::Lt),
            "lte" => Some(Lookup::Lte),
            "in" => Some(Lookup::In),
            "isnull" => Some(Lookup::IsNull),
            _ => None,
        }
    }

    fn applies_to(&self, kind: FieldKind) -> bool {
        use Lookup::*;
        match kind {
            FieldKind::Text => matches!(
                self,
                Exact | IExact | Contains | IContains | StartsWith | IStartsWith | EndsWith
                    | IEndsWith | In | IsNull
            ),
            FieldKind::Integer | FieldKind::Date => {
                matches!(self, Exact | Gt | Gte | Lt | Lte | In | IsNull)
            }
            FieldKind::Boolean => matches!(self, Exact | IsNull),
        }
    }
}

/// A typed filter operand, bound as a query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Integer(i64),
    Text(String),
    Date(NaiveDate),
    Boolean(bool),
}

impl FilterValue {
    fn parse(kind: FieldKind, raw: &str) -> Option<Self> {
        match kind {
            FieldKind::Integer => parse_int(raw).map(FilterValue::Integer),
            // PostgreSQL text cannot hold NUL
            FieldKind::Text if raw.contains('\0') => None,
            FieldKind::Text => Some(FilterValue::Text(raw.to_string())),
            FieldKind::Date => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .ok()
                .map(FilterValue::Date),
            FieldKind::Boolean => parse_bool(raw).map(FilterValue::Boolean),
        }
    }
}

/// Right-hand side of a lookup filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOperand {
    Value(FilterValue),
    List(Vec<FilterValue>),
    /// `true` selects rows where the column is null
    IsNull(bool),
}

/// One `field[__lookup]=value` query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFilter {
    pub field: BookField,
    pub lookup: Lookup,
    pub operand: FilterOperand,
}

impl BookFilter {
    pub fn parse(key: &str, raw: &str) -> AppResult<Self> {
        let (name, lookup_name) = match key.split_once(LOOKUP_SEPARATOR) {
            Some((name, lookup)) => (name, Some(lookup)),
            None => (key, None),
        };

        let field = BookField::from_name(name)
            .ok_or_else(|| malformed(format!("unknown filter field '{}'", name)))?;
        let lookup = match lookup_name {
            Some(lookup_name) => Lookup::from_name(lookup_name)
                .ok_or_else(|| malformed(format!("unknown lookup '{}'", lookup_name)))?,
            None => Lookup::Exact,
        };
        if !lookup.applies_to(field.kind()) {
            return Err(malformed(format!(
                "lookup {:?} does not apply to '{}'",
                lookup,
                field.column()
            )));
        }

        let invalid = || malformed(format!("invalid value '{}' for '{}'", raw, key));
        let operand = match lookup {
            Lookup::IsNull => FilterOperand::IsNull(parse_bool(raw).ok_or_else(invalid)?),
            Lookup::In => {
                let items: Vec<&str> = raw.split(',').collect();
                if items.len() > MAX_IN_ITEMS {
                    return Err(malformed(format!(
                        "'{}' lists {} items, at most {} allowed",
                        key,
                        items.len(),
                        MAX_IN_ITEMS
                    )));
                }
                FilterOperand::List(
                    items
                        .into_iter()
                        .map(|item| FilterValue::parse(field.kind(), item).ok_or_else(invalid))
                        .collect::<AppResult<Vec<_>>>()?,
                )
            }
            _ => {
                let value = FilterValue::parse(field.kind(), raw).ok_or_else(invalid)?;
                FilterOperand::Value(value)
            }
        };

        Ok(Self {
            field,
            lookup,
            operand,
        })
    }
}

/// Requested ordering: a column and a direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: BookField,
    pub descending: bool,
}

impl OrderBy {
    /// The twelve accepted values: six columns, each optionally prefixed with `-`
    pub fn parse(raw: &str) -> Option<Self> {
        let (name, descending) = match raw.strip_prefix('-') {
            Some(name) => (name, true),
            None => (raw, false),
        };
        let field = match name {
            "title" => BookField::Title,
            "author" => BookField::Author,
            "description" => BookField::Description,
            "picture" => BookField::Picture,
            "date_published" => BookField::DatePublished,
            "id" => BookField::Id,
            _ => return None,
        };
        Some(Self { field, descending })
    }
}

impl Default for OrderBy {
    /// Newest first
    fn default() -> Self {
        Self {
            field: BookField::Id,
            descending: true,
        }
    }
}

impl std::fmt::Display for OrderBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.descending {
            write!(f, "-")?;
        }
        write!(f, "{}", self.field.column())
    }
}

/// Parsed list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Return every match instead of one page
    pub all: bool,
    pub page: i64,
    pub page_size: i64,
    pub order_by: OrderBy,
    pub filters: Vec<BookFilter>,
}

impl ListQuery {
    /// Build a query from raw query-string pairs. When a key repeats, its
    /// last value wins.
    pub fn from_params(params: Vec<(String, String)>, default_page_size: i64) -> AppResult<Self> {
        let mut all = false;
        let mut page = None;
        let mut page_size = None;
        let mut order_by = None;
        let mut raw_filters: Vec<(String, String)> = Vec::new();

        for (key, value) in params {
            match key.as_str() {
                PARAM_ALL => all = true,
                PARAM_PAGE => page = Some(value),
                PARAM_PAGE_SIZE => page_size = Some(value),
                PARAM_ORDER_BY => order_by = Some(value),
                _ => match raw_filters.iter_mut().find(|(existing, _)| *existing == key) {
                    Some(entry) => entry.1 = value,
                    None => raw_filters.push((key, value)),
                },
            }
        }

        let page_size = match page_size {
            Some(raw) => {
                let size = parse_int(&raw)
                    .ok_or_else(|| malformed(format!("pageSize '{}' is not an integer", raw)))?;
                if size < 1 {
                    return Err(malformed(format!("pageSize {} is not positive", size)));
                }
                size
            }
            None => default_page_size,
        };

        let page = match page {
            Some(raw) => parse_int(&raw)
                .ok_or_else(|| malformed(format!("page '{}' is not an integer", raw)))?,
            None => DEFAULT_PAGE,
        };

        let order_by = match order_by {
            Some(raw) => OrderBy::parse(&raw)
                .ok_or_else(|| malformed(format!("orderBy '{}' is not supported", raw)))?,
            None => OrderBy::default(),
        };

        let filters = raw_filters
            .iter()
            .map(|(key, value)| BookFilter::parse(key, value))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            all,
            page,
            page_size,
            order_by,
            filters,
        })
    }
}

/// Rows to fetch from an ordered result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub offset: i64,
    pub limit: i64,
}

/// Pagination metadata for one page of a result set. Indexes are 1-based
/// and zero when the page holds no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start_index: i64,
    pub end_index: i64,
    pub num_pages: i64,
    /// Rows to fetch, `None` when the page is empty
    pub slice: Option<Slice>,
}

impl PageWindow {
    /// Window for `page` over `total` rows. An empty result set still has a
    /// single empty page; a page outside `1..=num_pages` is empty.
    pub fn paginate(total: i64, page: i64, page_size: i64) -> Self {
        let page_size = page_size.max(1);
        let num_pages = if total <= 0 {
            1
        } else {
            (total - 1) / page_size + 1
        };

        if total <= 0 || page < 1 || page > num_pages {
            return Self {
                start_index: 0,
                end_index: 0,
                num_pages,
                slice: None,
            };
        }

        let offset = (page - 1).saturating_mul(page_size);
        let end_index = page.saturating_mul(page_size).min(total);
        Self {
            start_index: offset + 1,
            end_index,
            num_pages,
            slice: Some(Slice {
                offset,
                limit: end_index - offset,
            }),
        }
    }

    /// Window describing an unpaginated result. `num_pages` stays 0.
    pub fn unpaginated(total: i64) -> Self {
        Self {
            start_index: if total > 0 { 1 } else { 0 },
            end_index: total.max(0),
            num_pages: 0,
            slice: None,
        }
    }
}

/// List response envelope
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookListResponse {
    pub data: Vec<BookJson>,
    /// 1-based index of the first returned book, 0 if none
    pub start_index: i64,
    /// 1-based index of the last returned book, 0 if none
    pub end_index: i64,
    /// Number of books matching the filters
    pub total: i64,
    /// Number of pages, 0 when pagination is disabled
    pub num_pages: i64,
}

fn malformed(detail: String) -> AppError {
    AppError::MalformedRequest(detail)
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}
