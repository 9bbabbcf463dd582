use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::types::*;

/// Persistence for campgrounds and their comments.
#[async_trait]
pub trait CampgroundStore: Send + Sync {
    /// All campgrounds, oldest first.
    async fn list_campgrounds(&self) -> Result<Vec<Campground>, StoreError>;

    /// A single campground.
    async fn find_campground(&self, id: &Uuid) -> Result<Option<Campground>, StoreError>;

    /// Inserts a campground with an empty comment list.
    async fn insert_campground(&self, campground: NewCampground) -> Result<Campground, StoreError>;

    /// Applies `changes` and returns the updated campground.
    async fn update_campground(
        &self,
        id: &Uuid,
        changes: CampgroundChanges,
    ) -> Result<Campground, StoreError>;

    /// Deletes a campground together with every comment in its list and
    /// returns the deleted campground.
    async fn delete_campground(&self, id: &Uuid) -> Result<Campground, StoreError>;

    /// The campground's comments in list order.
    async fn comments_for(&self, campground: &Campground) -> Result<Vec<Comment>, StoreError>;

    /// A single comment.
    async fn find_comment(&self, id: &Uuid) -> Result<Option<Comment>, StoreError>;

    /// Creates a comment and appends it to the campground's list.
    async fn add_comment(
        &self,
        campground_id: &Uuid,
        comment: NewComment,
    ) -> Result<Comment, StoreError>;

    /// Replaces a comment's text.
    async fn update_comment(&self, id: &Uuid, text: String) -> Result<Comment, StoreError>;

    /// Deletes a comment and removes it from the campground's list.
    async fn delete_comment(&self, campground_id: &Uuid, id: &Uuid) -> Result<(), StoreError>;

    /// Deletes every campground and comment.
    async fn clear(&self) -> Result<(), StoreError>;
}

const CAMPGROUND_COLUMNS: &str = "id, name, price, description, image_url, image_id, \
     author_id, author_username, comment_ids, created_at";

const COMMENT_COLUMNS: &str = "id, text, author_id, author_username, created_at";

fn campground_from_row(row: &PgRow) -> Campground {
    Campground {
        id: row.get("id"),
        name: row.get("name"),
        price: row.get("price"),
        description: row.get("description"),
        image: CampgroundImage {
            url: row.get("image_url"),
            host_id: row.get("image_id"),
        },
        author: Author {
            id: row.get("author_id"),
            username: row.get("author_username"),
        },
        comment_ids: row.get("comment_ids"),
        created_at: row.get("created_at"),
    }
}

fn comment_from_row(row: &PgRow) -> Comment {
    Comment {
        id: row.get("id"),
        text: row.get("text"),
        author: Author {
            id: row.get("author_id"),
            username: row.get("author_username"),
        },
        created_at: row.get("created_at"),
    }
}

/// Orders `comments` to match `ids`, dropping ids with no comment.
pub(crate) fn in_list_order(ids: &[Uuid], mut comments: Vec<Comment>) -> Vec<Comment> {
    comments.sort_by_key(|c| ids.iter().position(|id| *id == c.id));
    comments.retain(|c| ids.contains(&c.id));
    comments
}

/// Campground store backed by the `campgrounds` and `comments` tables.
pub struct PgCampgroundStore {
    pool: PgPool,
}

impl PgCampgroundStore {
    /// Creates a store over the provided database connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampgroundStore for PgCampgroundStore {
    async fn list_campgrounds(&self) -> Result<Vec<Campground>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM campgrounds ORDER BY created_at ASC",
            CAMPGROUND_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(campground_from_row).collect())
    }

    async fn find_campground(&self, id: &Uuid) -> Result<Option<Campground>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM campgrounds WHERE id = $1",
            CAMPGROUND_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(campground_from_row))
    }

    async fn insert_campground(&self, campground: NewCampground) -> Result<Campground, StoreError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO campgrounds (
                id, name, price, description, image_url, image_id, author_id, author_username
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            CAMPGROUND_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(campground.name.trim())
        .bind(campground.price.trim())
        .bind(&campground.description)
        .bind(&campground.image.url)
        .bind(&campground.image.host_id)
        .bind(campground.author.id)
        .bind(&campground.author.username)
        .fetch_one(&self.pool)
        .await?;

        Ok(campground_from_row(&row))
    }

    async fn update_campground(
        &self,
        id: &Uuid,
        changes: CampgroundChanges,
    ) -> Result<Campground, StoreError> {
        let row = match &changes.image {
            Some(image) => {
                sqlx::query(&format!(
                    r#"
                    UPDATE campgrounds
                    SET name = $1, price = $2, description = $3, image_url = $4, image_id = $5
                    WHERE id = $6
                    RETURNING {}
                    "#,
                    CAMPGROUND_COLUMNS
                ))
                .bind(changes.name.trim())
                .bind(changes.price.trim())
                .bind(&changes.description)
                .bind(&image.url)
                .bind(&image.host_id)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    r#"
                    UPDATE campgrounds
                    SET name = $1, price = $2, description = $3
                    WHERE id = $4
                    RETURNING {}
                    "#,
                    CAMPGROUND_COLUMNS
                ))
                .bind(changes.name.trim())
                .bind(changes.price.trim())
                .bind(&changes.description)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        row.as_ref()
            .map(campground_from_row)
            .ok_or(StoreError::CampgroundNotFound)
    }

    async fn delete_campground(&self, id: &Uuid) -> Result<Campground, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "DELETE FROM campgrounds WHERE id = $1 RETURNING {}",
            CAMPGROUND_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let campground = row
            .as_ref()
            .map(campground_from_row)
            .ok_or(StoreError::CampgroundNotFound)?;

        let removed = sqlx::query("DELETE FROM comments WHERE id = ANY($1)")
            .bind(campground.comment_ids.as_slice())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        log::debug!(
            "Deleted campground {} and {} comments",
            campground.id,
            removed.rows_affected()
        );
        Ok(campground)
    }

    async fn comments_for(&self, campground: &Campground) -> Result<Vec<Comment>, StoreError> {
        if campground.comment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {} FROM comments WHERE id = ANY($1)",
            COMMENT_COLUMNS
        ))
        .bind(campground.comment_ids.as_slice())
        .fetch_all(&self.pool)
        .await?;

        let comments = rows.iter().map(comment_from_row).collect();
        Ok(in_list_order(&campground.comment_ids, comments))
    }

    async fn find_comment(&self, id: &Uuid) -> Result<Option<Comment>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM comments WHERE id = $1",
            COMMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(comment_from_row))
    }

    async fn add_comment(
        &self,
        campground_id: &Uuid,
        comment: NewComment,
    ) -> Result<Comment, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO comments (id, text, author_id, author_username)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            COMMENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&comment.text)
        .bind(comment.author.id)
        .bind(&comment.author.username)
        .fetch_one(&mut *tx)
        .await?;
        let comment = comment_from_row(&row);

        let appended = sqlx::query(
            "UPDATE campgrounds SET comment_ids = array_append(comment_ids, $1) WHERE id = $2",
        )
        .bind(comment.id)
        .bind(campground_id)
        .execute(&mut *tx)
        .await?;

        if appended.rows_affected() == 0 {
            return Err(StoreError::CampgroundNotFound);
        }

        tx.commit().await?;
        Ok(comment)
    }

    async fn update_comment(&self, id: &Uuid, text: String) -> Result<Comment, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE comments SET text = $1 WHERE id = $2 RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(&text)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(comment_from_row)
            .ok_or(StoreError::CommentNotFound)
    }

    async fn delete_comment(&self, campground_id: &Uuid, id: &Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE campgrounds SET comment_ids = array_remove(comment_ids, $1) WHERE id = $2",
        )
        .bind(id)
        .bind(campground_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::CommentNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM comments").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM campgrounds")
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn comment(id: Uuid) -> Comment {
        Comment {
            id,
            text: "nice".to_string(),
            author: Author {
                id: Uuid::new_v4(),
                username: "Homer".to_string(),
            },
            created_at: Utc::now(),
        }
    }

    #[test]
    fn comments_follow_the_campground_list_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let fetched = vec![comment(c), comment(a), comment(b)];

        let ordered = in_list_order(&[a, b, c], fetched);
        let ids: Vec<Uuid> = ordered.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn comments_missing_from_the_list_are_dropped() {
        let (a, stray) = (Uuid::new_v4(), Uuid::new_v4());

        let ordered = in_list_order(&[a], vec![comment(stray), comment(a)]);
        assert_eq!(ordered.len(), 1);
        assert_eq!(ordered[0].id, a);
    }

    async fn pg_store() -> PgCampgroundStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = postgres::database::create_connection_pool(&url)
            .await
            .unwrap();
        postgres::database::run_migrations(&pool).await.unwrap();
        PgCampgroundStore::new(pool)
    }

    fn ned() -> Author {
        Author {
            id: Uuid::new_v4(),
            username: "Ned".to_string(),
        }
    }

    async fn insert(store: &PgCampgroundStore) -> Campground {
        store
            .insert_campground(NewCampground {
                name: "  Lake Springfield ".to_string(),
                price: "12".to_string(),
                description: "Three-eyed fish".to_string(),
                image: CampgroundImage {
                    url: "https://images.test/lake.jpg".to_string(),
                    host_id: Some("yelpcamp/lake".to_string()),
                },
                author: ned(),
            })
            .await
            .unwrap()
    }

    async fn post(store: &PgCampgroundStore, campground: &Campground, text: &str) -> Comment {
        store
            .add_comment(
                &campground.id,
                NewComment {
                    text: text.to_string(),
                    author: ned(),
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn pg_comments_are_appended_and_removed_from_the_list() {
        let store = pg_store().await;
        let campground = insert(&store).await;
        assert_eq!(campground.name, "Lake Springfield");
        assert!(campground.comment_ids.is_empty());

        let first = post(&store, &campground, "first").await;
        let second = post(&store, &campground, "second").await;

        let reloaded = store.find_campground(&campground.id).await.unwrap().unwrap();
        assert_eq!(reloaded.comment_ids, vec![first.id, second.id]);
        let texts: Vec<String> = store
            .comments_for(&reloaded)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, vec!["first", "second"]);

        store.delete_comment(&campground.id, &first.id).await.unwrap();
        let reloaded = store.find_campground(&campground.id).await.unwrap().unwrap();
        assert_eq!(reloaded.comment_ids, vec![second.id]);
        assert!(store.find_comment(&first.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_comment(&campground.id, &first.id).await,
            Err(StoreError::CommentNotFound)
        ));

        store.delete_campground(&campground.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn pg_deleting_a_campground_deletes_its_comments() {
        let store = pg_store().await;
        let campground = insert(&store).await;
        let comment = post(&store, &campground, "doomed").await;

        let deleted = store.delete_campground(&campground.id).await.unwrap();
        assert_eq!(deleted.comment_ids, vec![comment.id]);
        assert!(store.find_campground(&campground.id).await.unwrap().is_none());
        assert!(store.find_comment(&comment.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_campground(&campground.id).await,
            Err(StoreError::CampgroundNotFound)
        ));
    }

    #[tokio::test]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn pg_comment_on_a_missing_campground_fails() {
        let store = pg_store().await;
        let missing = Uuid::new_v4();

        let result = store
            .add_comment(
                &missing,
                NewComment {
                    text: "hello?".to_string(),
                    author: ned(),
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::CampgroundNotFound)));
    }
}
