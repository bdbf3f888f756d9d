use crate::DbError;
use async_trait::async_trait;
use core_types::{Pagination, Person, PersonFilter, PersonPayload};
use sqlx::postgres::{PgPool, Postgres};
use sqlx::QueryBuilder;

/// The storage contract for `Person` rows.
///
/// Every read excludes soft-deleted rows. Implementations must be safe to share
/// between request handlers.
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Inserts a new row and returns it with its storage-assigned fields.
    async fn insert_person(&self, person: &PersonPayload) -> Result<Person, DbError>;

    /// Fetches a live row by id, or `DbError::NotFound`.
    async fn get_person(&self, id: i64) -> Result<Person, DbError>;

    /// Fetches one page of live rows matching `filter`, ordered by id.
    async fn list_persons(
        &self,
        filter: &PersonFilter,
        page: Pagination,
    ) -> Result<Vec<Person>, DbError>;

    /// Overwrites every writable column of a live row, or `DbError::NotFound`.
    async fn update_person(&self, id: i64, person: &PersonPayload) -> Result<Person, DbError>;

    /// Stamps `deleted_at` on a live row. Missing or already deleted ids are a no-op.
    async fn soft_delete_person(&self, id: i64) -> Result<(), DbError>;
}

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersonStore for DbRepository {
    async fn insert_person(&self, person: &PersonPayload) -> Result<Person, DbError> {
        let created = sqlx::query_as::<_, Person>(
            r#"
            INSERT INTO persons (first_name, last_name, patronymic, age, gender, country)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at, updated_at, deleted_at,
                      first_name, last_name, patronymic, age, gender, country
            "#,
        )
        .bind(&person.first_name)
        .bind(&person.last_name)
        .bind(&person.patronymic)
        .bind(person.age)
        .bind(&person.gender)
        .bind(&person.country)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_person(&self, id: i64) -> Result<Person, DbError> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            SELECT id, created_at, updated_at, deleted_at,
                   first_name, last_name, patronymic, age, gender, country
            FROM persons
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| if let sqlx::Error::RowNotFound = e { DbError::NotFound } else { e.into() })?;

        Ok(person)
    }

    async fn list_persons(
        &self,
        filter: &PersonFilter,
        page: Pagination,
    ) -> Result<Vec<Person>, DbError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT id, created_at, updated_at, deleted_at, \
             first_name, last_name, patronymic, age, gender, country \
             FROM persons WHERE deleted_at IS NULL",
        );

        if let Some(name) = &filter.name {
            qb.push(" AND first_name ILIKE ");
            qb.push_bind(like_pattern(name));
        }
        if let Some(gender) = &filter.gender {
            qb.push(" AND gender = ");
            qb.push_bind(gender);
        }
        if let Some(country) = &filter.country {
            qb.push(" AND country = ");
            qb.push_bind(country);
        }

        qb.push(" ORDER BY id ASC LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let persons = qb.build_query_as::<Person>().fetch_all(&self.pool).await?;
        Ok(persons)
    }

    async fn update_person(&self, id: i64, person: &PersonPayload) -> Result<Person, DbError> {
        let updated = sqlx::query_as::<_, Person>(
            r#"
            UPDATE persons
            SET first_name = $2, last_name = $3, patronymic = $4,
                age = $5, gender = $6, country = $7, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, created_at, updated_at, deleted_at,
                      first_name, last_name, patronymic, age, gender, country
            "#,
        )
        .bind(id)
        .bind(&person.first_name)
        .bind(&person.last_name)
        .bind(&person.patronymic)
        .bind(person.age)
        .bind(&person.gender)
        .bind(&person.country)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| if let sqlx::Error::RowNotFound = e { DbError::NotFound } else { e.into() })?;

        Ok(updated)
    }

    async fn soft_delete_person(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query(
            "UPDATE persons SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(id, "Soft delete matched no live row.");
        }
        Ok(())
    }
}

/// Wraps `name` for a substring `ILIKE`, escaping the pattern metacharacters
/// so user input only ever matches literally.
fn like_pattern(name: &str) -> String {
    let mut pattern = String::with_capacity(name.len() + 2);
    pattern.push('%');
    for c in name.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
