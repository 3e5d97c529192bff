//! Dynamic query builder
//!
//! [`QueryParams`] is the raw request: filter criteria, a free-text search
//! term, paging and an optional sort. [`QueryParams::compile`] validates it
//! against an entity's field table and yields a [`DynamicQuery`], which both
//! the in-memory store ([`DynamicQuery::apply`]) and the Postgres store
//! ([`crate::sql::SqlQuery`]) execute. All validation happens before any
//! store is touched.

use error_common::EmrError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entity::{Entity, Field};
use crate::filter::{CompiledFilter, FilterCriterion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// Nulls sort below every value, so they lead ascending and trail descending
    pub fn nulls_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "NULLS FIRST",
            SortOrder::Desc => "NULLS LAST",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

impl FromStr for SortOrder {
    type Err = EmrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(EmrError::invalid_sort_order()),
        }
    }
}

/// A validated page: `number >= 1`, `size >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u64,
    pub size: u64,
}

impl Page {
    /// Page size is checked before page number
    pub fn new(number: i64, size: i64, max_size: u64) -> Result<Self, EmrError> {
        let size = u64::try_from(size)
            .ok()
            .filter(|s| (1..=max_size).contains(s))
            .ok_or_else(EmrError::page_size_invalid)?;
        let number = u64::try_from(number)
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(EmrError::page_number_invalid)?;
        Ok(Self { number, size })
    }

    /// `(number - 1) * size`, saturating
    pub fn skip(&self) -> u64 {
        self.number.saturating_sub(1).saturating_mul(self.size)
    }

    pub fn total_pages(&self, total_count: u64) -> u64 {
        if total_count == 0 {
            return 1;
        }
        total_count.div_ceil(self.size)
    }
}

/// Raw query input as it arrives from a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryParams {
    pub filters: Vec<FilterCriterion>,
    pub search: Option<String>,
    pub page_number: i64,
    pub page_size: i64,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    /// Comma-separated projection list
    pub fields: Option<String>,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            search: None,
            page_number: 1,
            page_size: 20,
            sort_field: None,
            sort_order: None,
            fields: None,
        }
    }
}

impl QueryParams {
    pub fn new(page_number: i64, page_size: i64) -> Self {
        Self {
            page_number,
            page_size,
            ..Default::default()
        }
    }

    pub fn with_filters(mut self, filters: Vec<FilterCriterion>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_filter(mut self, filter: FilterCriterion) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: impl Into<String>) -> Self {
        self.sort_field = Some(field.into());
        self.sort_order = Some(order.into());
        self
    }

    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    /// Validate against `E` and resolve every name to a field accessor
    pub fn compile<E: Entity>(&self, max_page_size: u64) -> Result<DynamicQuery<E>, EmrError> {
        let page = Page::new(self.page_number, self.page_size, max_page_size)?;
        let mut query = DynamicQuery::unpaged(&self.filters, self.search.as_deref())?;
        query.page = Some(page);

        let sort_field = self.sort_field.as_deref().map(str::trim).filter(|s| !s.is_empty());
        if let Some(name) = sort_field {
            let order = match self.sort_order.as_deref().map(str::trim) {
                None | Some("") => SortOrder::Asc,
                Some(raw) => raw.parse()?,
            };
            let field = E::field(name)
                .ok_or_else(|| EmrError::validation(format!("Invalid sort field: {name}")))?;
            query.sort = Some(Sort { field, order });
        }

        Ok(query)
    }
}

/// Resolved sort key
pub struct Sort<E: 'static> {
    pub field: &'static Field<E>,
    pub order: SortOrder,
}

impl<E: 'static> Clone for Sort<E> {
    fn clone(&self) -> Self {
        Self {
            field: self.field,
            order: self.order,
        }
    }
}

impl<E: 'static> fmt::Debug for Sort<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sort({} {})", self.field.name, self.order)
    }
}

/// A validated query bound to entity type `E`
pub struct DynamicQuery<E: 'static> {
    pub filters: Vec<CompiledFilter<E>>,
    /// Trimmed, lowercased, non-empty
    pub search: Option<String>,
    pub sort: Option<Sort<E>>,
    /// `None` for counting queries
    pub page: Option<Page>,
}

impl<E: Entity> DynamicQuery<E> {
    /// Filters and search only, no sort or paging
    pub fn unpaged(filters: &[FilterCriterion], search: Option<&str>) -> Result<Self, EmrError> {
        let filters = filters
            .iter()
            .map(FilterCriterion::compile::<E>)
            .collect::<Result<Vec<_>, _>>()?;
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        Ok(Self {
            filters,
            search,
            sort: None,
            page: None,
        })
    }

    /// The same predicate without sort or paging
    pub fn without_paging(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            search: self.search.clone(),
            sort: None,
            page: None,
        }
    }

    /// Filters ANDed, search matching any searchable text field
    pub fn matches(&self, entity: &E) -> bool {
        if !self.filters.iter().all(|f| f.matches(entity)) {
            return false;
        }
        match &self.search {
            None => true,
            Some(term) => E::searchable_fields().iter().any(|field| {
                field
                    .value(entity)
                    .as_text()
                    .is_some_and(|text| text.to_lowercase().contains(term.as_str()))
            }),
        }
    }

    /// Filter, sort and page an in-memory collection
    pub fn apply<I>(&self, items: I) -> Vec<E>
    where
        I: IntoIterator<Item = E>,
    {
        let mut matched: Vec<E> = items.into_iter().filter(|e| self.matches(e)).collect();

        if let Some(sort) = &self.sort {
            // Stable sort keeps natural order among equal keys
            matched.sort_by(|a, b| {
                let ordering = sort.field.value(a).sort_cmp(&sort.field.value(b));
                match sort.order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                }
            });
        }

        match self.page {
            None => matched,
            Some(page) => {
                let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
                let take = usize::try_from(page.size).unwrap_or(usize::MAX);
                matched.into_iter().skip(skip).take(take).collect()
            }
        }
    }
}

impl<E: 'static> fmt::Debug for DynamicQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicQuery")
            .field("filters", &self.filters)
            .field("search", &self.search)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .finish()
    }
}

/// One page of results with its position in the full result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page_number: u64,
    pub page_size: u64,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, page: Page, total_count: u64) -> Self {
        let total_pages = page.total_pages(total_count);
        Self {
            items,
            page_number: page.number,
            page_size: page.size,
            total_count,
            total_pages,
            has_next: page.number < total_pages,
            has_previous: page.number > 1,
        }
    }

    pub fn map<U, F>(self, f: F) -> Paged<U>
    where
        F: FnMut(T) -> U,
    {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
