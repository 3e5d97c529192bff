//! SQL rendering of a [`DynamicQuery`]
//!
//! Column names come from the entity's static field table, never from
//! caller input; every operand is a bound parameter.
//!
//! ```rust,ignore
//! let query = params.compile::<Visit>(max_page_size)?;
//! let mut sql = SqlQuery::select(&query);
//! let visits: Vec<Visit> = sql.build_query_as().fetch_all(pool).await?;
//! ```

use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{Postgres, QueryBuilder};

use crate::entity::Entity;
use crate::filter::{CompiledFilter, FilterOperator};
use crate::query::DynamicQuery;
use crate::value::{FieldKind, FieldValue};

/// Postgres statement built from a validated query
pub struct SqlQuery {
    query: QueryBuilder<'static, Postgres>,
}

impl SqlQuery {
    /// `SELECT * ... WHERE ... ORDER BY ... LIMIT ... OFFSET ...`
    pub fn select<E: Entity>(query: &DynamicQuery<E>) -> Self {
        let mut sql = Self {
            query: QueryBuilder::new(format!("SELECT * FROM {} WHERE 1=1", E::TABLE)),
        };
        sql.push_predicate(query);

        let mut order_by = Vec::new();
        if let Some(sort) = &query.sort {
            order_by.push(format!(
                "{} {} {}",
                sort.field.name,
                sort.order.as_sql(),
                sort.order.nulls_sql()
            ));
        }
        // LIMIT/OFFSET needs a total order for pages to partition the result
        if query.page.is_some() && !matches!(&query.sort, Some(s) if s.field.name == "id") {
            order_by.push("id ASC".to_string());
        }
        if !order_by.is_empty() {
            sql.query.push(format!(" ORDER BY {}", order_by.join(", ")));
        }

        if let Some(page) = query.page {
            sql.query.push(" LIMIT ");
            sql.query.push_bind(i64::try_from(page.size).unwrap_or(i64::MAX));
            sql.query.push(" OFFSET ");
            sql.query.push_bind(i64::try_from(page.skip()).unwrap_or(i64::MAX));
        }
        sql
    }

    /// `SELECT COUNT(*) ... WHERE ...`, ignoring sort and paging
    pub fn count<E: Entity>(query: &DynamicQuery<E>) -> Self {
        let mut sql = Self {
            query: QueryBuilder::new(format!("SELECT COUNT(*) FROM {} WHERE 1=1", E::TABLE)),
        };
        sql.push_predicate(query);
        sql
    }

    /// `INSERT INTO table (columns...) VALUES (...)`
    pub fn insert<E: Entity>(entity: &E) -> Self {
        let fields = E::fields();
        let columns: Vec<&str> = fields.iter().map(|f| f.name).collect();
        let mut query =
            QueryBuilder::new(format!("INSERT INTO {} ({}) VALUES (", E::TABLE, columns.join(", ")));

        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                query.push(", ");
            }
            push_value(&mut query, field.kind, field.value(entity));
        }
        query.push(")");
        Self { query }
    }

    /// `UPDATE table SET every non-id column WHERE id = ...`
    pub fn update<E: Entity>(id: uuid::Uuid, entity: &E) -> Self {
        let mut query = QueryBuilder::new(format!("UPDATE {} SET ", E::TABLE));

        let columns = E::fields().iter().filter(|f| f.name != "id");
        for (i, field) in columns.enumerate() {
            if i > 0 {
                query.push(", ");
            }
            query.push(format!("{} = ", field.name));
            push_value(&mut query, field.kind, field.value(entity));
        }
        query.push(" WHERE id = ");
        query.push_bind(id);
        Self { query }
    }

    pub fn find_by_id<E: Entity>(id: uuid::Uuid) -> Self {
        let mut query = QueryBuilder::new(format!("SELECT * FROM {} WHERE id = ", E::TABLE));
        query.push_bind(id);
        Self { query }
    }

    pub fn delete<E: Entity>(id: uuid::Uuid) -> Self {
        let mut query = QueryBuilder::new(format!("DELETE FROM {} WHERE id = ", E::TABLE));
        query.push_bind(id);
        Self { query }
    }

    fn push_predicate<E: Entity>(&mut self, query: &DynamicQuery<E>) {
        for filter in &query.filters {
            self.query.push(" AND ");
            push_filter(&mut self.query, filter);
        }

        if let Some(term) = &query.search {
            let searchable = E::searchable_fields();
            if searchable.is_empty() {
                // Nothing can match a search on an entity without text fields
                self.query.push(" AND FALSE");
            } else {
                self.query.push(" AND (");
                for (i, field) in searchable.iter().enumerate() {
                    if i > 0 {
                        self.query.push(" OR ");
                    }
                    self.query.push(format!("{} ILIKE ", field.name));
                    self.query.push_bind(format!("%{}%", escape_like(term)));
                }
                self.query.push(")");
            }
        }
    }

    /// The rendered SQL with `$n` placeholders
    pub fn sql(&self) -> &str {
        self.query.sql()
    }

    pub fn build(&mut self) -> sqlx::query::Query<'_, Postgres, PgArguments> {
        self.query.build()
    }

    pub fn build_query_as<T>(&mut self) -> QueryAs<'_, Postgres, T, PgArguments>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
    {
        self.query.build_query_as()
    }

    pub fn build_query_scalar<T>(&mut self) -> QueryScalar<'_, Postgres, T, PgArguments>
    where
        T: sqlx::Type<Postgres> + for<'r> sqlx::Decode<'r, Postgres>,
        (T,): for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>,
    {
        self.query.build_query_scalar()
    }
}

fn push_filter<E>(query: &mut QueryBuilder<'static, Postgres>, filter: &CompiledFilter<E>) {
    let column = filter.field.name;
    let kind = filter.field.kind;
    let operand = filter.operand.clone();

    match filter.operator {
        FilterOperator::IsNull => {
            query.push(format!("{column} IS NULL"));
        }
        FilterOperator::IsNotNull => {
            query.push(format!("{column} IS NOT NULL"));
        }
        FilterOperator::Equal => {
            query.push(format!("{column} = "));
            push_value(query, kind, operand);
        }
        // Null columns count as "not equal", matching the in-memory semantics
        FilterOperator::NotEqual => {
            query.push(format!("{column} IS DISTINCT FROM "));
            push_value(query, kind, operand);
        }
        FilterOperator::GreaterThan => {
            query.push(format!("{column} > "));
            push_value(query, kind, operand);
        }
        FilterOperator::GreaterThanOrEqual => {
            query.push(format!("{column} >= "));
            push_value(query, kind, operand);
        }
        FilterOperator::LessThan => {
            query.push(format!("{column} < "));
            push_value(query, kind, operand);
        }
        FilterOperator::LessThanOrEqual => {
            query.push(format!("{column} <= "));
            push_value(query, kind, operand);
        }
        FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
            let needle = escape_like(operand.as_text().unwrap_or_default());
            let pattern = match filter.operator {
                FilterOperator::Contains => format!("%{needle}%"),
                FilterOperator::StartsWith => format!("{needle}%"),
                _ => format!("%{needle}"),
            };
            query.push(format!("{column} ILIKE "));
            query.push_bind(pattern);
        }
    }
}

/// Bind `value` with the Postgres type of `kind`, including typed NULLs
fn push_value(query: &mut QueryBuilder<'static, Postgres>, kind: FieldKind, value: FieldValue) {
    match value {
        FieldValue::Bool(v) => query.push_bind(v),
        FieldValue::Int(v) => query.push_bind(v),
        FieldValue::Decimal(v) => query.push_bind(v),
        FieldValue::Text(v) => query.push_bind(v),
        FieldValue::Uuid(v) => query.push_bind(v),
        FieldValue::Date(v) => query.push_bind(v),
        FieldValue::DateTime(v) => query.push_bind(v),
        FieldValue::Null => match kind {
            FieldKind::Bool => query.push_bind(None::<bool>),
            FieldKind::Int => query.push_bind(None::<i64>),
            FieldKind::Decimal => query.push_bind(None::<rust_decimal::Decimal>),
            FieldKind::Text => query.push_bind(None::<String>),
            FieldKind::Uuid => query.push_bind(None::<uuid::Uuid>),
            FieldKind::Date => query.push_bind(None::<chrono::NaiveDate>),
            FieldKind::DateTime => query.push_bind(None::<chrono::DateTime<chrono::Utc>>),
        },
    };
}

/// Escape `\`, `%` and `_` for use inside an ILIKE pattern
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterCriterion;
    use crate::query::QueryParams;
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Referral {
        id: Uuid,
        specialty: String,
        urgent: bool,
        notes: Option<String>,
    }

    crate::impl_entity!(Referral, table = "referrals", fields = [
        id: Uuid,
        specialty: Text [searchable],
        urgent: Bool,
        notes: Text [searchable],
    ]);

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Counter {
        id: Uuid,
        total: i64,
    }

    crate::impl_entity!(Counter, table = "counters", fields = [id: Uuid, total: Int]);

    #[test]
    fn test_select_with_paging_only() {
        let query = QueryParams::new(3, 25).compile::<Referral>(100).unwrap();
        let sql = SqlQuery::select(&query);
        assert_eq!(sql.sql(), "SELECT * FROM referrals WHERE 1=1 ORDER BY id ASC LIMIT $1 OFFSET $2");
    }

    #[test]
    fn test_select_with_filters_search_and_sort() {
        let query = QueryParams::new(1, 10)
            .with_filter(FilterCriterion::new("Urgent", FilterOperator::Equal, "true"))
            .with_filter(FilterCriterion::new("Specialty", FilterOperator::StartsWith, "card"))
            .with_filter(FilterCriterion::new("Notes", FilterOperator::IsNull, ""))
            .with_search("echo")
            .with_sort("specialty", "desc")
            .compile::<Referral>(100)
            .unwrap();
        let sql = SqlQuery::select(&query);
        assert_eq!(
            sql.sql(),
            "SELECT * FROM referrals WHERE 1=1 AND urgent = $1 AND specialty ILIKE $2 \
             AND notes IS NULL AND (specialty ILIKE $3 OR notes ILIKE $4) \
             ORDER BY specialty DESC NULLS LAST, id ASC LIMIT $5 OFFSET $6"
        );
    }

    #[test]
    fn test_ascending_sort_puts_nulls_first() {
        let query = QueryParams::new(1, 1)
            .with_sort("notes", "asc")
            .compile::<Referral>(100)
            .unwrap();
        assert_eq!(
            SqlQuery::select(&query).sql(),
            "SELECT * FROM referrals WHERE 1=1 ORDER BY notes ASC NULLS FIRST, id ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn test_sort_by_id_needs_no_tiebreaker() {
        let query = QueryParams::new(2, 5)
            .with_sort("id", "desc")
            .compile::<Referral>(100)
            .unwrap();
        assert_eq!(
            SqlQuery::select(&query).sql(),
            "SELECT * FROM referrals WHERE 1=1 ORDER BY id DESC NULLS LAST LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn test_unpaged_select_has_no_order() {
        let query = DynamicQuery::<Referral>::unpaged(&[], None).unwrap();
        assert_eq!(SqlQuery::select(&query).sql(), "SELECT * FROM referrals WHERE 1=1");
    }

    #[test]
    fn test_not_equal_includes_nulls() {
        let query = QueryParams::new(1, 10)
            .with_filter(FilterCriterion::new("notes", FilterOperator::NotEqual, "x"))
            .compile::<Referral>(100)
            .unwrap();
        assert!(SqlQuery::count(&query).sql().contains("notes IS DISTINCT FROM $1"));
    }

    #[test]
    fn test_count_ignores_sort_and_paging() {
        let query = QueryParams::new(2, 10)
            .with_sort("urgent", "asc")
            .compile::<Referral>(100)
            .unwrap();
        assert_eq!(SqlQuery::count(&query).sql(), "SELECT COUNT(*) FROM referrals WHERE 1=1");
    }

    #[test]
    fn test_search_without_text_fields_matches_nothing() {
        let query = QueryParams::new(1, 10).with_search("x").compile::<Counter>(100).unwrap();
        assert_eq!(
            SqlQuery::count(&query).sql(),
            "SELECT COUNT(*) FROM counters WHERE 1=1 AND FALSE"
        );
    }

    #[test]
    fn test_insert_update_delete() {
        let referral = Referral {
            id: Uuid::new_v4(),
            specialty: "Cardiology".to_string(),
            urgent: false,
            notes: None,
        };

        assert_eq!(
            SqlQuery::insert(&referral).sql(),
            "INSERT INTO referrals (id, specialty, urgent, notes) VALUES ($1, $2, $3, $4)"
        );
        assert_eq!(
            SqlQuery::update(referral.id, &referral).sql(),
            "UPDATE referrals SET specialty = $1, urgent = $2, notes = $3 WHERE id = $4"
        );
        assert_eq!(
            SqlQuery::delete::<Referral>(referral.id).sql(),
            "DELETE FROM referrals WHERE id = $1"
        );
        assert_eq!(
            SqlQuery::find_by_id::<Referral>(referral.id).sql(),
            "SELECT * FROM referrals WHERE id = $1"
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like(r"50%_off\"), r"50\%\_off\\");
    }
}
