use super::crud::CrudService;
use super::repository::{Assignments, Repository};
use crate::error::AppError;
use crate::model::BlogPost;
use crate::query::PageRequest;
use crate::sql::{self, column_list, quoted, Conditions, QueryBuf};
use crate::store::Tables;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct BlogRepo<'a> {
    pool: &'a PgPool,
    tables: &'a Tables,
}

impl<'a> BlogRepo<'a> {
    pub fn new(pool: &'a PgPool, tables: &'a Tables) -> Self {
        BlogRepo { pool, tables }
    }

    fn columns(alias: &str) -> String {
        format!(
            "{}, u.{} AS {}",
            column_list(Some(alias), BlogPost::COLUMNS),
            quoted("username"),
            quoted("author_username")
        )
    }

    fn from_clause(&self) -> String {
        format!(
            "{} b JOIN {} u ON u.{} = b.{}",
            self.tables.blog_posts,
            self.tables.users,
            quoted("id"),
            quoted("author_id")
        )
    }

    fn joined(&self, write: QueryBuf) -> QueryBuf {
        QueryBuf {
            sql: format!(
                "WITH w AS ({}) SELECT {} FROM w JOIN {} u ON u.{} = w.{}",
                write.sql,
                Self::columns("w"),
                self.tables.users,
                quoted("id"),
                quoted("author_id")
            ),
            params: write.params,
        }
    }

    const ORDER: &'static str = "b.\"created_at\" DESC, b.\"id\" DESC";
}

#[async_trait]
impl Repository for BlogRepo<'_> {
    type Record = BlogPost;
    type Filter = ();

    async fn create(&self, values: &Assignments) -> Result<BlogPost, AppError> {
        let write = sql::insert(&self.tables.blog_posts, values, &column_list(None, BlogPost::COLUMNS));
        let post: BlogPost = CrudService::fetch_one(self.pool, &self.joined(write)).await?;
        tracing::info!(post_id = post.id, author_id = post.author_id, "blog post created");
        Ok(post)
    }

    async fn get(&self, id: i64) -> Result<Option<BlogPost>, AppError> {
        let mut c = Conditions::with_alias("b");
        c.eq("id", id);
        let q = sql::select(&Self::columns("b"), &self.from_clause(), &c, "", None, None);
        CrudService::fetch_optional(self.pool, &q).await
    }

    async fn list(&self, _filter: &(), page: &PageRequest) -> Result<(Vec<BlogPost>, i64), AppError> {
        let c = Conditions::with_alias("b");
        let count = CrudService::count(self.pool, &sql::count(&self.from_clause(), &c)).await?;
        let q = sql::select(
            &Self::columns("b"),
            &self.from_clause(),
            &c,
            Self::ORDER,
            Some(page.limit()),
            Some(page.offset()),
        );
        let rows = CrudService::fetch_all(self.pool, &q).await?;
        Ok((rows, count))
    }

    async fn update(&self, id: i64, values: &Assignments) -> Result<Option<BlogPost>, AppError> {
        let write = sql::update(
            &self.tables.blog_posts,
            id,
            values,
            false,
            &[],
            &column_list(None, BlogPost::COLUMNS),
        );
        CrudService::fetch_optional(self.pool, &self.joined(write)).await
    }

    async fn remove(&self, id: i64) -> Result<bool, AppError> {
        let q = sql::delete(&self.tables.blog_posts, id);
        let n = CrudService::execute(self.pool, &q.sql, &q.params).await?;
        if n > 0 {
            tracing::info!(post_id = id, "blog post deleted");
        }
        Ok(n > 0)
    }
}
