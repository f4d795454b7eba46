//! Repository for the `pomucky` catalog table, including full-text search.
//!
//! Search builds its SQL with [`QueryBuilder`] because the filter is
//! optional piecewise. The page query, the total count and every facet share
//! one FROM/WHERE so facets always describe the current result set.

use pomucky_core::catalog::{CatalogFilter, CatalogQuery, CatalogSort, SearchField, SEARCH_FIELDS};
use pomucky_core::types::DbId;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::pomucka::{CatalogFacets, CatalogPage, CreatePomucka, Pomucka, UpdatePomucka};

/// Column list shared across queries. `images` is gathered per row.
const COLUMNS: &str = "id, name, signatura, isxn, categories, author, year, company, \
     description, misto_vydani, disadv_type, disadv_degree, disadv_tool, \
     ARRAY(SELECT i.id FROM images i WHERE i.pomucka_id = pomucky.id ORDER BY i.id) AS images, \
     created_at, updated_at";

/// Text configuration for both documents and queries. Stock PostgreSQL has
/// no Czech stemmer, so matching is on whole lower-cased tokens.
const TS_CONFIG: &str = "'simple'";

/// Provides CRUD and search over the catalog.
pub struct PomuckaRepo;

impl PomuckaRepo {
    /// Insert a new catalog entry, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePomucka) -> Result<Pomucka, sqlx::Error> {
        let query = format!(
            "INSERT INTO pomucky
                (name, signatura, isxn, categories, author, year, company, description,
                 misto_vydani, disadv_type, disadv_degree, disadv_tool)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        let d = &input.details;
        sqlx::query_as::<_, Pomucka>(&query)
            .bind(&input.name)
            .bind(&input.signatura)
            .bind(input.isxn)
            .bind(&input.categories)
            .bind(&d.author)
            .bind(d.year)
            .bind(&d.company)
            .bind(&d.description)
            .bind(&d.misto_vydani)
            .bind(&d.disadv_type)
            .bind(&d.disadv_degree)
            .bind(&d.disadv_tool)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Pomucka>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pomucky WHERE id = $1");
        sqlx::query_as::<_, Pomucka>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM pomucky WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Update a catalog entry. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePomucka,
    ) -> Result<Option<Pomucka>, sqlx::Error> {
        let query = format!(
            "UPDATE pomucky SET
                name = COALESCE($2, name),
                signatura = COALESCE($3, signatura),
                isxn = COALESCE($4, isxn),
                categories = COALESCE($5, categories),
                author = COALESCE($6, author),
                year = COALESCE($7, year),
                company = COALESCE($8, company),
                description = COALESCE($9, description),
                misto_vydani = COALESCE($10, misto_vydani),
                disadv_type = COALESCE($11, disadv_type),
                disadv_degree = COALESCE($12, disadv_degree),
                disadv_tool = COALESCE($13, disadv_tool)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let d = &input.details;
        sqlx::query_as::<_, Pomucka>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.signatura)
            .bind(input.isxn)
            .bind(&input.categories)
            .bind(&d.author)
            .bind(d.year)
            .bind(&d.company)
            .bind(&d.description)
            .bind(&d.misto_vydani)
            .bind(&d.disadv_type)
            .bind(&d.disadv_degree)
            .bind(&d.disadv_tool)
            .fetch_optional(pool)
            .await
    }

    /// Delete a catalog entry and, by cascade, its images. Fails with a
    /// foreign key violation while instances still reference it.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pomucky WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_instances(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM instances WHERE pomucka_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// One page of matching entries plus the total count and facets.
    pub async fn search(pool: &PgPool, query: &CatalogQuery) -> Result<CatalogPage, sqlx::Error> {
        let filter = &query.filter;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS}"));
        push_from(&mut qb, filter, "");
        push_where(&mut qb, filter);
        qb.push(" ORDER BY ").push(order_by(query));
        qb.push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset());
        let items = qb.build_query_as::<Pomucka>().fetch_all(pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        push_from(&mut qb, filter, "");
        push_where(&mut qb, filter);
        let total = qb.build_query_scalar::<i64>().fetch_one(pool).await?;

        let facets = Self::facets(pool, filter).await?;

        Ok(CatalogPage {
            items,
            total,
            page: query.page,
            limit: query.limit,
            facets,
        })
    }

    /// Distinct author, year, company, place of publication and category
    /// values among entries matching `filter`, each sorted ascending.
    pub async fn facets(pool: &PgPool, filter: &CatalogFilter) -> Result<CatalogFacets, sqlx::Error> {
        let authors = text_facet(pool, filter, "author", "").await?;
        let companies = text_facet(pool, filter, "company", "").await?;
        let places = text_facet(pool, filter, "misto_vydani", "").await?;
        let categories =
            text_facet(pool, filter, "c", ", unnest(pomucky.categories) AS c").await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT DISTINCT year AS value");
        push_from(&mut qb, filter, "");
        push_where(&mut qb, filter);
        qb.push(" AND year IS NOT NULL ORDER BY value");
        let years = qb.build_query_scalar::<i32>().fetch_all(pool).await?;

        Ok(CatalogFacets {
            authors,
            years,
            companies,
            places,
            categories,
        })
    }

    /// Facets over the whole catalog, for building search forms.
    pub async fn search_options(pool: &PgPool) -> Result<CatalogFacets, sqlx::Error> {
        Self::facets(pool, &CatalogFilter::default()).await
    }
}

async fn text_facet(
    pool: &PgPool,
    filter: &CatalogFilter,
    column: &str,
    extra_from: &str,
) -> Result<Vec<String>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT DISTINCT {column} AS value"));
    push_from(&mut qb, filter, extra_from);
    push_where(&mut qb, filter);
    qb.push(format!(
        " AND {column} IS NOT NULL AND {column} <> '' ORDER BY value"
    ));
    qb.build_query_scalar::<String>().fetch_all(pool).await
}

/// SQL text of one searchable field.
fn field_sql(field: SearchField) -> &'static str {
    match field {
        SearchField::Name => "name",
        SearchField::Categories => "array_to_string(categories, ' ')",
        SearchField::Description => "description",
        SearchField::Author => "author",
        SearchField::Company => "company",
        SearchField::Year => "year::text",
        SearchField::Place => "misto_vydani",
    }
}

/// All searchable fields as one document. `concat_ws` skips NULLs.
fn document_sql() -> String {
    let fields: Vec<&str> = SEARCH_FIELDS.iter().map(|f| field_sql(*f)).collect();
    format!("to_tsvector({TS_CONFIG}, concat_ws(' ', {}))", fields.join(", "))
}

/// Weighted sum of per-field ranks against the `query` FROM item.
fn rank_sql() -> String {
    let terms: Vec<String> = SEARCH_FIELDS
        .iter()
        .map(|f| {
            format!(
                "{:.1} * ts_rank(to_tsvector({TS_CONFIG}, COALESCE({}, '')), query)",
                f.weight(),
                field_sql(*f)
            )
        })
        .collect();
    format!("({})", terms.join(" + "))
}

fn order_by(query: &CatalogQuery) -> String {
    match query.sort {
        CatalogSort::Newest => "id DESC".to_string(),
        CatalogSort::Relevance if query.filter.tsquery.is_some() => {
            format!("{} DESC, id ASC", rank_sql())
        }
        CatalogSort::Relevance => "id ASC".to_string(),
    }
}

/// `FROM pomucky`, joined with the parsed text query when there is one so
/// it is bound only once.
fn push_from(qb: &mut QueryBuilder<'_, Postgres>, filter: &CatalogFilter, extra_from: &str) {
    qb.push(" FROM pomucky");
    if let Some(tsquery) = &filter.tsquery {
        qb.push(format!(", to_tsquery({TS_CONFIG}, "))
            .push_bind(tsquery.clone())
            .push(") AS query");
    }
    qb.push(extra_from);
}

fn push_where(qb: &mut QueryBuilder<'_, Postgres>, filter: &CatalogFilter) {
    qb.push(" WHERE TRUE");
    if filter.tsquery.is_some() {
        qb.push(format!(" AND {} @@ query", document_sql()));
    }
    if !filter.ids.is_empty() {
        qb.push(" AND pomucky.id = ANY(")
            .push_bind(filter.ids.clone())
            .push(")");
    }
    if !filter.categories.is_empty() {
        qb.push(" AND pomucky.categories && ")
            .push_bind(filter.categories.clone());
    }
}
