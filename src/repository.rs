use crate::{
    models::{
        AdminDashboard, DashboardCounts, NewStore, NewUser, OwnedStore, OwnerDashboard, Rating,
        RatingStats, RatingWithUser, Store, StoreListing, StoreOverview, StoreRater, User,
        UserSummary,
    },
    query::SqlQuery,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;

/// RepoError
///
/// Persistence failures the handlers need to tell apart. Constraint
/// violations are classified here so handlers never inspect SQLSTATE codes.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A unique constraint rejected the write (e.g. duplicate email).
    #[error("unique constraint violated")]
    Conflict,

    /// A foreign key pointed at a row that does not exist.
    #[error("referenced row does not exist")]
    MissingReference,

    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return RepoError::Conflict;
            }
            if db_err.is_foreign_key_violation() {
                return RepoError::MissingReference;
            }
        }
        RepoError::Database(err)
    }
}

/// Repository Trait
///
/// The contract for all persistence operations. Handlers only see this
/// trait, so tests can substitute an in-memory implementation.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across
/// Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    /// Insert a validated user. `RepoError::Conflict` on a duplicate email.
    async fn create_user(&self, user: NewUser, password_hash: String) -> Result<UserSummary, RepoError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    /// Returns false when no user has `id`.
    async fn update_password(&self, id: i32, password_hash: String) -> Result<bool, RepoError>;
    async fn list_users(&self, query: &SqlQuery) -> Result<Vec<UserSummary>, RepoError>;

    // --- Stores ---
    async fn create_store(&self, store: NewStore) -> Result<Store, RepoError>;
    async fn list_stores(&self, query: &SqlQuery) -> Result<Vec<StoreListing>, RepoError>;

    // --- Ratings ---
    /// Insert, or replace the caller's existing rating for the store.
    async fn upsert_rating(
        &self,
        user_id: i32,
        store_id: i32,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Rating, RepoError>;
    async fn store_ratings(&self, store_id: i32) -> Result<Vec<RatingWithUser>, RepoError>;
    async fn rating_stats(&self, store_id: i32) -> Result<RatingStats, RepoError>;

    // --- Dashboards ---
    async fn admin_dashboard(&self) -> Result<AdminDashboard, RepoError>;
    /// `None` when the owner has no store.
    async fn owner_dashboard(&self, owner_id: i32) -> Result<Option<OwnerDashboard>, RepoError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The `Repository` backed by PostgreSQL. Every statement is parameterized.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_user(&self, user: NewUser, password_hash: String) -> Result<UserSummary, RepoError> {
        let created = sqlx::query_as::<_, UserSummary>(
            r#"
            INSERT INTO users (name, email, password_hash, user_role, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, address, user_role AS role
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&password_hash)
        .bind(user.role.as_str())
        .bind(&user.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, user_role, address, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_password(&self, id: i32, password_hash: String) -> Result<bool, RepoError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// list_users
    ///
    /// Runs a statement produced by the query builder; filter values arrive
    /// only as bound parameters.
    async fn list_users(&self, query: &SqlQuery) -> Result<Vec<UserSummary>, RepoError> {
        let rows = query
            .bind_all(sqlx::query_as::<_, UserSummary>(&query.sql))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn create_store(&self, store: NewStore) -> Result<Store, RepoError> {
        let created = sqlx::query_as::<_, Store>(
            r#"
            INSERT INTO stores (name, email, address, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, address, owner_id
            "#,
        )
        .bind(&store.name)
        .bind(&store.email)
        .bind(&store.address)
        .bind(store.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_stores(&self, query: &SqlQuery) -> Result<Vec<StoreListing>, RepoError> {
        let rows = query
            .bind_all(sqlx::query_as::<_, StoreListing>(&query.sql))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// upsert_rating
    ///
    /// Keyed on `UNIQUE(user_id, store_id)`. A resubmission without a comment
    /// keeps the previous comment.
    async fn upsert_rating(
        &self,
        user_id: i32,
        store_id: i32,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Rating, RepoError> {
        let saved = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (store_id, user_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, store_id)
            DO UPDATE SET rating = EXCLUDED.rating,
                          comment = COALESCE(EXCLUDED.comment, ratings.comment),
                          updated_at = NOW()
            RETURNING id, store_id, user_id, rating, comment, updated_at
            "#,
        )
        .bind(store_id)
        .bind(user_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn store_ratings(&self, store_id: i32) -> Result<Vec<RatingWithUser>, RepoError> {
        let rows = sqlx::query_as::<_, RatingWithUser>(
            r#"
            SELECT r.id, r.store_id, r.user_id, r.rating, r.comment, r.updated_at,
                   u.name AS user_name
            FROM ratings r
            JOIN users u ON r.user_id = u.id
            WHERE r.store_id = $1
            ORDER BY r.updated_at DESC
            "#,
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn rating_stats(&self, store_id: i32) -> Result<RatingStats, RepoError> {
        let stats = sqlx::query_as::<_, RatingStats>(
            r#"
            SELECT ROUND(AVG(rating)::numeric, 2)::float8 AS avg_rating,
                   COUNT(*) AS total_ratings
            FROM ratings
            WHERE store_id = $1
            "#,
        )
        .bind(store_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    /// admin_dashboard
    ///
    /// Totals, every store with its owner and average, and every user.
    async fn admin_dashboard(&self) -> Result<AdminDashboard, RepoError> {
        let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let total_stores = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stores")
            .fetch_one(&self.pool)
            .await?;
        let total_ratings = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ratings")
            .fetch_one(&self.pool)
            .await?;

        let stores = sqlx::query_as::<_, StoreOverview>(
            r#"
            SELECT s.id, s.name, s.email, s.address,
                   u.id AS owner_id, u.name AS owner_name, u.email AS owner_email,
                   ROUND(COALESCE(AVG(r.rating), 0)::numeric, 2)::float8 AS avg_rating
            FROM stores s
            LEFT JOIN users u ON s.owner_id = u.id
            LEFT JOIN ratings r ON s.id = r.store_id
            GROUP BY s.id, u.id
            ORDER BY s.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, name, email, address, user_role AS role FROM users ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(AdminDashboard {
            counts: DashboardCounts {
                total_users,
                total_stores,
                total_ratings,
            },
            stores,
            users,
        })
    }

    /// owner_dashboard
    ///
    /// The owner's first store (lowest id) and everyone who rated it.
    async fn owner_dashboard(&self, owner_id: i32) -> Result<Option<OwnerDashboard>, RepoError> {
        let store = sqlx::query_as::<_, OwnedStore>(
            r#"
            SELECT s.id, s.name, s.email, s.address,
                   ROUND(COALESCE(AVG(r.rating), 0)::numeric, 2)::float8 AS avg_rating
            FROM stores s
            LEFT JOIN ratings r ON s.id = r.store_id
            WHERE s.owner_id = $1
            GROUP BY s.id
            ORDER BY s.id ASC
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(store) = store else {
            return Ok(None);
        };

        let users = sqlx::query_as::<_, StoreRater>(
            r#"
            SELECT u.id AS user_id, u.name, u.email, r.rating, r.comment
            FROM ratings r
            JOIN users u ON r.user_id = u.id
            WHERE r.store_id = $1
            ORDER BY r.updated_at DESC
            "#,
        )
        .bind(store.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OwnerDashboard { store, users }))
    }
}
