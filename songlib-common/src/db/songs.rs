//! Song persistence
//!
//! [`SongStore`] is the storage seam the service talks to;
//! [`SqliteSongStore`] is its SQLite implementation.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::models::{Song, SongEnrichment, SongFilter, SongSummary, SongUpdate};
use crate::pagination::PageRequest;
use crate::Result;

/// Storage operations on songs
#[async_trait]
pub trait SongStore: Send + Sync {
    /// Insert a base record (group and title only), returning its new id
    async fn insert_base(&self, group_name: &str, song_title: &str) -> Result<i64>;

    /// Write enrichment fields onto an existing record
    ///
    /// Returns `false` if no record has this id.
    async fn apply_enrichment(&self, id: i64, enrichment: &SongEnrichment) -> Result<bool>;

    /// Point lookup by id
    async fn fetch(&self, id: i64) -> Result<Option<Song>>;

    /// Filtered listing ordered by id
    async fn list(&self, filter: &SongFilter, page: PageRequest) -> Result<Vec<SongSummary>>;

    /// Overwrite every field of a record; `false` if no record has this id
    async fn update(&self, id: i64, update: &SongUpdate) -> Result<bool>;

    /// Remove a record; `false` if no record has this id
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLite-backed song store
#[derive(Debug, Clone)]
pub struct SqliteSongStore {
    pool: SqlitePool,
}

impl SqliteSongStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn song_from_row(row: &SqliteRow) -> Result<Song> {
    Ok(Song {
        id: row.try_get("id")?,
        group_name: row.try_get("group_name")?,
        song_title: row.try_get("song_title")?,
        release_date: row.try_get("release_date")?,
        text: row.try_get("text")?,
        link: row.try_get("link")?,
    })
}

fn summary_from_row(row: &SqliteRow) -> Result<SongSummary> {
    Ok(SongSummary {
        id: row.try_get("id")?,
        group_name: row.try_get("group_name")?,
        song_title: row.try_get("song_title")?,
        release_date: row.try_get("release_date")?,
    })
}

#[async_trait]
impl SongStore for SqliteSongStore {
    async fn insert_base(&self, group_name: &str, song_title: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO songs (group_name, song_title) VALUES (?, ?)")
            .bind(group_name)
            .bind(song_title)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn apply_enrichment(&self, id: i64, enrichment: &SongEnrichment) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE songs
            SET release_date = ?, text = ?, link = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(enrichment.release_date)
        .bind(&enrichment.text)
        .bind(&enrichment.link)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn fetch(&self, id: i64) -> Result<Option<Song>> {
        let row = sqlx::query(
            r#"
            SELECT id, group_name, song_title, release_date, text, link
            FROM songs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(song_from_row).transpose()
    }

    async fn list(&self, filter: &SongFilter, page: PageRequest) -> Result<Vec<SongSummary>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, group_name, song_title, release_date FROM songs WHERE 1 = 1",
        );

        // instr() instead of LIKE so '%' and '_' in user input match literally
        if let Some(group_name) = &filter.group_name {
            query
                .push(" AND instr(lower(group_name), lower(")
                .push_bind(group_name.clone())
                .push(")) > 0");
        }
        if let Some(song_title) = &filter.song_title {
            query
                .push(" AND instr(lower(song_title), lower(")
                .push_bind(song_title.clone())
                .push(")) > 0");
        }
        if let Some(release_date) = filter.release_date {
            query.push(" AND release_date = ").push_bind(release_date);
        }

        query
            .push(" ORDER BY id ASC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(summary_from_row).collect()
    }

    async fn update(&self, id: i64, update: &SongUpdate) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE songs
            SET group_name = ?, song_title = ?, release_date = ?, text = ?, link = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(&update.group_name)
        .bind(&update.song_title)
        .bind(update.release_date)
        .bind(&update.text)
        .bind(&update.link)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_memory_database;
    use chrono::NaiveDate;

    async fn store() -> SqliteSongStore {
        let pool = init_memory_database()
            .await
            .expect("Failed to create in-memory database");
        SqliteSongStore::new(pool)
    }

    fn enrichment() -> SongEnrichment {
        SongEnrichment {
            release_date: NaiveDate::from_ymd_opt(2006, 7, 16).unwrap(),
            text: "verse one\n\nverse two".to_string(),
            link: "https://example.com/song".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_base_record() {
        let store = store().await;
        let id = store.insert_base("Muse", "Starlight").await.unwrap();
        assert!(id > 0);

        let song = store.fetch(id).await.unwrap().expect("song should exist");
        assert_eq!(song.group_name, "Muse");
        assert_eq!(song.song_title, "Starlight");
        assert_eq!(song.release_date, None);
        assert_eq!(song.text, None);
        assert_eq!(song.link, None);
    }

    #[tokio::test]
    async fn test_ids_are_distinct() {
        let store = store().await;
        let a = store.insert_base("A", "one").await.unwrap();
        let b = store.insert_base("A", "one").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_fetch_missing_is_none() {
        let store = store().await;
        assert_eq!(store.fetch(404).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_apply_enrichment() {
        let store = store().await;
        let id = store.insert_base("Muse", "Starlight").await.unwrap();

        assert!(store.apply_enrichment(id, &enrichment()).await.unwrap());

        let song = store.fetch(id).await.unwrap().unwrap();
        assert!(song.is_enriched());
        assert_eq!(song.release_date, NaiveDate::from_ymd_opt(2006, 7, 16));
        assert_eq!(song.text.as_deref(), Some("verse one\n\nverse two"));
        assert_eq!(song.link.as_deref(), Some("https://example.com/song"));
    }

    #[tokio::test]
    async fn test_apply_enrichment_missing_record() {
        let store = store().await;
        assert!(!store.apply_enrichment(99, &enrichment()).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_overwrites_all_fields() {
        let store = store().await;
        let id = store.insert_base("Muse", "Starlight").await.unwrap();
        store.apply_enrichment(id, &enrichment()).await.unwrap();

        let update = SongUpdate {
            group_name: "Radiohead".to_string(),
            song_title: "Creep".to_string(),
            release_date: None,
            text: Some("new text".to_string()),
            link: None,
        };
        assert!(store.update(id, &update).await.unwrap());

        let song = store.fetch(id).await.unwrap().unwrap();
        assert_eq!(song.group_name, "Radiohead");
        assert_eq!(song.song_title, "Creep");
        assert_eq!(song.release_date, None);
        assert_eq!(song.text.as_deref(), Some("new text"));
        assert_eq!(song.link, None);
    }

    #[tokio::test]
    async fn test_update_missing_record() {
        let store = store().await;
        let update = SongUpdate {
            group_name: "x".to_string(),
            song_title: "y".to_string(),
            ..Default::default()
        };
        assert!(!store.update(1, &update).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store().await;
        let id = store.insert_base("Muse", "Starlight").await.unwrap();

        assert!(store.delete(id).await.unwrap());
        assert_eq!(store.fetch(id).await.unwrap(), None);
        assert!(!store.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_default_page_is_first_ten_by_id() {
        let store = store().await;
        for i in 0..15 {
            store.insert_base("Group", &format!("Song {}", i)).await.unwrap();
        }

        let page = store
            .list(&SongFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].song_title, "Song 0");
        assert_eq!(page[9].song_title, "Song 9");

        let second = store
            .list(&SongFilter::default(), PageRequest::from_params(Some("2"), None))
            .await
            .unwrap();
        assert_eq!(second.len(), 5);
        assert_eq!(second[0].song_title, "Song 10");
    }

    #[tokio::test]
    async fn test_list_group_filter_is_case_insensitive_substring() {
        let store = store().await;
        store.insert_base("Muse", "Starlight").await.unwrap();
        store.insert_base("Amused Band", "Other").await.unwrap();
        store.insert_base("Radiohead", "Creep").await.unwrap();

        let filter = SongFilter::from_params(Some("mUSe"), None, None).unwrap();
        let songs = store.list(&filter, PageRequest::default()).await.unwrap();

        let groups: Vec<_> = songs.iter().map(|s| s.group_name.as_str()).collect();
        assert_eq!(groups, vec!["Muse", "Amused Band"]);
    }

    #[tokio::test]
    async fn test_list_title_filter_treats_wildcards_literally() {
        let store = store().await;
        store.insert_base("A", "100% Pure").await.unwrap();
        store.insert_base("B", "1000 Pure").await.unwrap();

        let filter = SongFilter::from_params(None, Some("0%"), None).unwrap();
        let songs = store.list(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].song_title, "100% Pure");
    }

    #[tokio::test]
    async fn test_list_release_date_filter() {
        let store = store().await;
        let enriched = store.insert_base("Muse", "Starlight").await.unwrap();
        store.apply_enrichment(enriched, &enrichment()).await.unwrap();
        store.insert_base("Muse", "Uprising").await.unwrap();

        let filter = SongFilter::from_params(None, None, Some("2006-07-16")).unwrap();
        let songs = store.list(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].id, enriched);
        assert_eq!(songs[0].release_date, NaiveDate::from_ymd_opt(2006, 7, 16));
    }

    #[tokio::test]
    async fn test_list_combined_filters() {
        let store = store().await;
        store.insert_base("Muse", "Starlight").await.unwrap();
        store.insert_base("Muse", "Uprising").await.unwrap();

        let filter = SongFilter::from_params(Some("muse"), Some("RISING"), None).unwrap();
        let songs = store.list(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].song_title, "Uprising");
    }
}
