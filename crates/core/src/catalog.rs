//! Catalog search composition and import cleaning for aid entries.
//!
//! [`CatalogQuery::compose`] validates raw query parameters and produces a
//! store-independent filter; the repository layer turns it into SQL. The
//! relevance weights of the full-text search live here so every caller
//! ranks the same way.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE: i64 = 0;
pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 200;

/// Value of the `sort` parameter that orders by creation, newest first.
pub const SORT_NEWEST: &str = "newest";

/// `Cache-Control` max-age for search option listings (12 hours).
pub const SEARCH_OPTIONS_MAX_AGE_SECS: u32 = 43_200;

// ---------------------------------------------------------------------------
// Relevance weights
// ---------------------------------------------------------------------------

/// Fields covered by the free-text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Name,
    Categories,
    Description,
    Author,
    Company,
    Year,
    /// Place of publication.
    Place,
}

impl SearchField {
    pub fn weight(self) -> f32 {
        match self {
            SearchField::Name => 10.0,
            SearchField::Categories => 5.0,
            SearchField::Description => 5.0,
            SearchField::Author => 4.0,
            SearchField::Company => 4.0,
            SearchField::Year => 3.0,
            SearchField::Place => 1.0,
        }
    }
}

pub const SEARCH_FIELDS: [SearchField; 7] = [
    SearchField::Name,
    SearchField::Categories,
    SearchField::Description,
    SearchField::Author,
    SearchField::Company,
    SearchField::Year,
    SearchField::Place,
];

/// Turn user input into a PostgreSQL `tsquery` matching any of its terms.
///
/// Terms are split on anything that is not alphanumeric, so punctuation in
/// category codes (`K.II.09`) never reaches the tsquery parser. Returns
/// `None` when nothing searchable remains.
///
/// ```
/// use pomucky_core::catalog::build_tsquery;
/// assert_eq!(build_tsquery("slabikář 1995"), Some("slabikář | 1995".to_string()));
/// assert_eq!(build_tsquery(" -- "), None);
/// ```
pub fn build_tsquery(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" | "))
    }
}

// ---------------------------------------------------------------------------
// Query composition
// ---------------------------------------------------------------------------

/// Raw `GET /pomucky/search` parameters.
///
/// List parameters accept both `categories[]=a&categories[]=b` and the
/// bracket-less form.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogSearchParams {
    pub q: Option<String>,
    #[serde(default, rename = "id[]", alias = "id")]
    pub ids: Vec<String>,
    #[serde(default, rename = "categories[]", alias = "categories")]
    pub categories: Vec<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSort {
    /// By text relevance when a search term is present, otherwise by id.
    Relevance,
    /// Most recently created first.
    Newest,
}

/// Filter shared by the page query and the facet computation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Prepared tsquery (see [`build_tsquery`]).
    pub tsquery: Option<String>,
    pub ids: Vec<DbId>,
    pub categories: Vec<String>,
}

impl CatalogFilter {
    pub fn is_empty(&self) -> bool {
        self.tsquery.is_none() && self.ids.is_empty() && self.categories.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub filter: CatalogFilter,
    pub page: i64,
    pub limit: i64,
    pub sort: CatalogSort,
}

impl CatalogQuery {
    /// Validate raw parameters. Out-of-range pagination, malformed ids and
    /// unknown sort keys fail with `InvalidQuery`.
    pub fn compose(params: CatalogSearchParams) -> Result<Self, CoreError> {
        let page = params.page.unwrap_or(DEFAULT_PAGE);
        if page < 0 {
            return Err(CoreError::InvalidQuery("page must be >= 0".into()));
        }

        let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(CoreError::InvalidQuery(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }

        let sort = match params.sort.as_deref() {
            None | Some("") => CatalogSort::Relevance,
            Some(SORT_NEWEST) => CatalogSort::Newest,
            Some(other) => {
                return Err(CoreError::InvalidQuery(format!("unknown sort '{other}'")));
            }
        };

        let ids = params
            .ids
            .iter()
            .map(|raw| {
                raw.trim()
                    .parse::<DbId>()
                    .map_err(|_| CoreError::InvalidQuery(format!("invalid id '{raw}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let categories = params
            .categories
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        let tsquery = params.q.as_deref().and_then(build_tsquery);

        Ok(Self {
            filter: CatalogFilter {
                tsquery,
                ids,
                categories,
            },
            page,
            limit,
            sort,
        })
    }

    pub fn offset(&self) -> i64 {
        self.page * self.limit
    }
}

// ---------------------------------------------------------------------------
// Import cleaning
// ---------------------------------------------------------------------------

static TRAILING_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,=: ]*$").expect("valid regex"));
static TRAILING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[, ]*$").expect("valid regex"));
static TRAILING_COLON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[: ]*$").expect("valid regex"));
static UNIV_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^UNIV[:.] ?").expect("valid regex"));
static DOUBLE_U_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^UU").expect("valid regex"));

/// Strip the catalog-card punctuation trailing a title (`Slabikář :` → `Slabikář`).
pub fn clean_name(raw: &str) -> String {
    TRAILING_NAME_RE.replace(raw, "").trim().to_string()
}

/// Authors and publishers carry trailing commas from card listings.
pub fn clean_person_or_company(raw: &str) -> String {
    TRAILING_COMMA_RE.replace(raw, "").trim().to_string()
}

/// Publication place: trailing colon and square brackets removed.
pub fn clean_publication_place(raw: &str) -> String {
    TRAILING_COLON_RE
        .replace(raw, "")
        .replace(['[', ']'], "")
        .trim()
        .to_string()
}

pub fn clean_signatura(raw: &str) -> String {
    raw.trim().trim_end_matches('/').trim().to_string()
}

/// Normalise a category code: trailing dot dropped, `UNIV:`/`UNIV.` prefix
/// collapsed to `U`.
pub fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    let replaced = UNIV_PREFIX_RE.replace(trimmed, "U");
    DOUBLE_U_RE.replace(&replaced, "U").trim().to_string()
}

/// Normalise and de-duplicate a category list, keeping first-seen order.
pub fn normalize_categories(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for category in raw.iter().map(|c| normalize_category(c)) {
        if !category.is_empty() && !out.contains(&category) {
            out.push(category);
        }
    }
    out
}
