use async_trait::async_trait;
use domains::{DomainError, Result, Thread, ThreadRepository};
use sqlx::{sqlite::SqlitePool, QueryBuilder, Sqlite};
use uuid::Uuid;

use super::{from_micros, map_sqlx, to_i64, to_micros, IN_LIST_CHUNK};

const THREAD_COLUMNS: &str = "id, text, author_id, parent_id, community_id, created_at";

pub struct SqliteThreadRepository {
    pool: SqlitePool,
}

impl SqliteThreadRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// `SELECT ... WHERE parent_id IN (...)`, leaving the builder open for
    /// further predicates.
    fn children_query<'a>(parent_ids: &'a [Uuid]) -> QueryBuilder<'a, Sqlite> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {THREAD_COLUMNS} FROM threads WHERE parent_id IN ("
        ));
        let mut separated = qb.separated(", ");
        for id in parent_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        qb
    }

    /// Replies to any of `parent_ids`, queried in chunks and merged oldest
    /// first.
    async fn children_in(
        &self,
        parent_ids: &[Uuid],
        exclude_author: Option<&str>,
    ) -> Result<Vec<Thread>> {
        let mut threads = Vec::new();
        for chunk in parent_ids.chunks(IN_LIST_CHUNK) {
            let mut qb = Self::children_query(chunk);
            if let Some(author_id) = exclude_author {
                qb.push(" AND author_id <> ").push_bind(author_id);
            }
            threads.extend(self.fetch(qb).await?);
        }
        threads.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(threads)
    }

    async fn fetch(&self, mut qb: QueryBuilder<'_, Sqlite>) -> Result<Vec<Thread>> {
        let rows: Vec<ThreadRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.into_iter().map(Thread::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct ThreadRow {
    id: Uuid,
    text: String,
    author_id: String,
    parent_id: Option<Uuid>,
    community_id: Option<String>,
    created_at: i64,
}

impl TryFrom<ThreadRow> for Thread {
    type Error = DomainError;

    fn try_from(row: ThreadRow) -> std::result::Result<Self, Self::Error> {
        Ok(Thread {
            id: row.id,
            text: row.text,
            author_id: row.author_id,
            parent_id: row.parent_id,
            community_id: row.community_id,
            created_at: from_micros(row.created_at)?,
        })
    }
}

#[async_trait]
impl ThreadRepository for SqliteThreadRepository {
    async fn insert(&self, thread: &Thread) -> Result<()> {
        sqlx::query(
            "INSERT INTO threads (id, text, author_id, parent_id, community_id, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(thread.id)
        .bind(&thread.text)
        .bind(&thread.author_id)
        .bind(thread.parent_id)
        .bind(&thread.community_id)
        .bind(to_micros(thread.created_at))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Thread>> {
        let sql = format!("SELECT {THREAD_COLUMNS} FROM threads WHERE id = ?");
        let row: Option<ThreadRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(Thread::try_from).transpose()
    }

    async fn find_by_author(&self, author_id: &str) -> Result<Vec<Thread>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {THREAD_COLUMNS} FROM threads WHERE author_id = "
        ));
        qb.push_bind(author_id)
            .push(" ORDER BY created_at ASC, id ASC");
        self.fetch(qb).await
    }

    async fn find_children(&self, parent_ids: &[Uuid]) -> Result<Vec<Thread>> {
        self.children_in(parent_ids, None).await
    }

    async fn find_replies_from_others(
        &self,
        parent_ids: &[Uuid],
        author_id: &str,
    ) -> Result<Vec<Thread>> {
        let mut replies = self.children_in(parent_ids, Some(author_id)).await?;
        replies.reverse();
        Ok(replies)
    }

    async fn find_top_level(&self, offset: u64, limit: u64) -> Result<Vec<Thread>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {THREAD_COLUMNS} FROM threads WHERE parent_id IS NULL \
             ORDER BY created_at DESC, id DESC LIMIT "
        ));
        qb.push_bind(to_i64(limit))
            .push(" OFFSET ")
            .push_bind(to_i64(offset));
        self.fetch(qb).await
    }

    async fn count_top_level(&self) -> Result<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM threads WHERE parent_id IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(u64::try_from(total).unwrap_or_default())
    }
}
