//! # Postgres stores
//!
//! Maps the `idea` and `users` tables to the domain models. Sequence
//! attributes live in `TEXT[]` columns. Listings are rendered from an
//! [`IdeaSelection`] with `QueryBuilder`, so every caller-supplied value is a
//! bound parameter.

use std::time::Duration;

use async_trait::async_trait;
use domains::{
    Idea, IdeaOrder, IdeaPredicate, IdeaRepository, IdeaSelection, Role, User, UserRepository,
};
use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Decode, Postgres, QueryBuilder, Row, Type};
use tracing::{debug, info};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens a pool and brings the schema up to date.
pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await?;
    MIGRATOR.run(&pool).await?;
    info!("postgres schema is up to date");
    Ok(pool)
}

/// Renders the listing query for `selection`.
pub fn build_select(selection: &IdeaSelection) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(selection.projection.columns().join(", "));
    qb.push(" FROM idea");

    for (i, predicate) in selection.predicates.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            IdeaPredicate::IdEquals(id) => {
                qb.push("id = ").push_bind(id.clone());
            }
            IdeaPredicate::HasMediaType(kind) => {
                qb.push_bind(kind.clone()).push(" = ANY(media_types)");
            }
            IdeaPredicate::MinVotes(min) => {
                qb.push("votes >= ").push_bind(*min);
            }
            IdeaPredicate::MaxVotes(max) => {
                qb.push("votes <= ").push_bind(*max);
            }
        }
    }

    qb.push(match selection.order {
        IdeaOrder::Insertion => " ORDER BY created_at ASC, id ASC",
        IdeaOrder::VotesDesc => " ORDER BY votes DESC",
    });
    qb.push(" LIMIT ").push_bind(selection.limit);
    qb.push(" OFFSET ").push_bind(selection.offset);
    qb
}

/// Columns left out by the projection decode to their empty value.
fn column_or_default<'r, T>(row: &'r PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: Decode<'r, Postgres> + Type<Postgres> + Default,
{
    match row.try_get(column) {
        Err(sqlx::Error::ColumnNotFound(_)) => Ok(T::default()),
        other => other,
    }
}

fn idea_from_row(row: &PgRow) -> Result<Idea, sqlx::Error> {
    Ok(Idea {
        id: row.try_get("id")?,
        author_email: row.try_get("author_email")?,
        summary: column_or_default(row, "summary")?,
        content: column_or_default(row, "content")?,
        media: column_or_default(row, "media")?,
        media_types: column_or_default(row, "media_types")?,
        tags: row.try_get("tags")?,
        issues: row.try_get("issues")?,
        issues_ips: column_or_default(row, "issues_ips")?,
        bad_flag: row.try_get("bad_flag")?,
        enabled: row.try_get("enabled")?,
        votes: row.try_get("votes")?,
        voters_ids: column_or_default(row, "voters_ids")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn user_from_row(row: &PgRow) -> anyhow::Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        role: role.parse::<Role>()?,
        name: row.try_get("name")?,
        country: row.try_get("country")?,
        score: row.try_get("score")?,
        is_auth: row.try_get("is_auth")?,
        auth_code: row.try_get("auth_code")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[derive(Debug, Clone)]
pub struct PgIdeaRepository {
    pool: PgPool,
}

impl PgIdeaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdeaRepository for PgIdeaRepository {
    async fn get(&self, id: &str) -> anyhow::Result<Option<Idea>> {
        let row = sqlx::query("SELECT * FROM idea WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(idea_from_row).transpose()?)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM idea")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create(&self, idea: &Idea) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO idea (id, author_email, summary, content, media, media_types, tags, issues, \
             issues_ips, bad_flag, enabled, votes, voters_ids, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(&idea.id)
        .bind(&idea.author_email)
        .bind(&idea.summary)
        .bind(&idea.content)
        .bind(&idea.media)
        .bind(&idea.media_types)
        .bind(&idea.tags)
        .bind(&idea.issues)
        .bind(&idea.issues_ips)
        .bind(idea.bad_flag)
        .bind(idea.enabled)
        .bind(idea.votes)
        .bind(&idea.voters_ids)
        .bind(idea.created_at)
        .bind(idea.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, idea: &Idea) -> anyhow::Result<()> {
        let result = sqlx::query(
            "UPDATE idea SET summary = $2, content = $3, media = $4, media_types = $5, tags = $6, \
             issues = $7, issues_ips = $8, bad_flag = $9, enabled = $10, votes = $11, \
             voters_ids = $12, updated_at = $13 WHERE id = $1",
        )
        .bind(&idea.id)
        .bind(&idea.summary)
        .bind(&idea.content)
        .bind(&idea.media)
        .bind(&idea.media_types)
        .bind(&idea.tags)
        .bind(&idea.issues)
        .bind(&idea.issues_ips)
        .bind(idea.bad_flag)
        .bind(idea.enabled)
        .bind(idea.votes)
        .bind(&idea.voters_ids)
        .bind(idea.updated_at)
        .execute(&self.pool)
        .await?;
        anyhow::ensure!(result.rows_affected() == 1, "no idea with id {}", idea.id);
        Ok(())
    }

    async fn delete(&self, id: &str) -> anyhow::Result<()> {
        let result = sqlx::query("DELETE FROM idea WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        anyhow::ensure!(result.rows_affected() == 1, "no idea with id {id}");
        Ok(())
    }

    async fn select(&self, selection: &IdeaSelection) -> anyhow::Result<Vec<Idea>> {
        let mut qb = build_select(selection);
        debug!(sql = qb.sql(), "idea listing");
        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(idea_from_row).collect::<Result<_, _>>()?)
    }
}

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn create(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO users (id, role, name, country, score, is_auth, auth_code, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&user.id)
        .bind(user.role.as_str())
        .bind(&user.name)
        .bind(&user.country)
        .bind(user.score)
        .bind(user.is_auth)
        .bind(&user.auth_code)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, user: &User) -> anyhow::Result<()> {
        let result = sqlx::query(
            "UPDATE users SET role = $2, name = $3, country = $4, score = $5, is_auth = $6, \
             auth_code = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(&user.id)
        .bind(user.role.as_str())
        .bind(&user.name)
        .bind(&user.country)
        .bind(user.score)
        .bind(user.is_auth)
        .bind(&user.auth_code)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        anyhow::ensure!(result.rows_affected() == 1, "no user with id {}", user.id);
        Ok(())
    }

    async fn delete(&self, email: &str) -> anyhow::Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        anyhow::ensure!(result.rows_affected() == 1, "no user with id {email}");
        Ok(())
    }
}
