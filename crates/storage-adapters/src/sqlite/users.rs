use async_trait::async_trait;
use domains::{
    AuthorSummary, DomainError, ProfileUpdate, Result, SortOrder, User, UserFilter,
    UserRepository,
};
use sqlx::{sqlite::SqlitePool, QueryBuilder, Sqlite};

use super::{from_micros, map_sqlx, to_i64, to_micros, IN_LIST_CHUNK};

const USER_COLUMNS: &str = "id, username, name, bio, image, onboarded, created_at";

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    name: String,
    bio: String,
    image: String,
    onboarded: bool,
    created_at: i64,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> std::result::Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            username: row.username,
            name: row.name,
            bio: row.bio,
            image: row.image,
            onboarded: row.onboarded,
            created_at: from_micros(row.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: String,
    name: String,
    image: String,
}

/// `%term%` with LIKE wildcards in the term matched literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Appends the WHERE clause shared by listing and counting.
fn push_filter<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filter: &'a UserFilter) {
    qb.push(" WHERE id <> ").push_bind(filter.exclude_id.as_str());
    if let Some(search) = &filter.search {
        // usernames are stored lowercased, names are folded into name_folded
        let pattern = like_pattern(&search.to_lowercase());
        qb.push(" AND (username LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR name_folded LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    /// Insert-or-update on the identity id. `created_at` is only written on
    /// insert.
    async fn upsert_profile(&self, profile: &ProfileUpdate) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (id, username, name, name_folded, bio, image, onboarded, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, 1, ?) \
             ON CONFLICT (id) DO UPDATE SET \
                 username = excluded.username, \
                 name = excluded.name, \
                 name_folded = excluded.name_folded, \
                 bio = excluded.bio, \
                 image = excluded.image, \
                 onboarded = 1 \
             RETURNING {USER_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&sql)
            .bind(&profile.user_id)
            .bind(&profile.username)
            .bind(&profile.name)
            .bind(profile.name.to_lowercase())
            .bind(&profile.bio)
            .bind(&profile.image)
            .bind(to_micros(chrono::Utc::now()))
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.try_into()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(User::try_from).transpose()
    }

    async fn find_summaries(&self, ids: &[String]) -> Result<Vec<AuthorSummary>> {
        let mut summaries = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(IN_LIST_CHUNK) {
            let mut qb =
                QueryBuilder::<Sqlite>::new("SELECT id, name, image FROM users WHERE id IN (");
            let mut separated = qb.separated(", ");
            for id in chunk {
                separated.push_bind(id.as_str());
            }
            separated.push_unseparated(")");

            let rows: Vec<SummaryRow> = qb
                .build_query_as()
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?;
            summaries.extend(rows.into_iter().map(|r| AuthorSummary {
                id: r.id,
                name: r.name,
                image: r.image,
            }));
        }
        Ok(summaries)
    }

    async fn search(
        &self,
        filter: &UserFilter,
        sort: SortOrder,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<User>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_filter(&mut qb, filter);
        let direction = sort.as_sql();
        qb.push(format!(" ORDER BY created_at {direction}, id {direction} LIMIT "))
            .push_bind(to_i64(limit))
            .push(" OFFSET ")
            .push_bind(to_i64(offset));

        let rows: Vec<UserRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn count(&self, filter: &UserFilter) -> Result<u64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users");
        push_filter(&mut qb, filter);
        let total: i64 = qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(u64::try_from(total).unwrap_or_default())
    }
}
