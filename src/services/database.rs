use crate::models::{JoinedRow, MentionRecord, PriceRecord};
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// SQLite store for daily mention counts and prices
///
/// Both tables are keyed by `(date, ticker)`; writes are upserts, so
/// re-running a day overwrites the earlier rows (last write wins).
#[derive(Debug, Clone)]
pub struct MentionStore {
    pool: SqlitePool,
    database_path: PathBuf,
}

impl MentionStore {
    /// Open (or create) the database and make sure the schema exists
    pub async fn new(database_path: PathBuf) -> Result<Self, sqlx::Error> {
        info!("Initializing SQLite database at: {:?}", database_path);

        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(sqlx::Error::Io)?;
            }
        }

        let connect_options = SqliteConnectOptions::new()
            .filename(&database_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePool::connect_with(connect_options).await?;

        let store = Self { pool, database_path };
        store.initialize_database().await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.database_path
    }

    async fn initialize_database(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mentions (
                date TEXT NOT NULL,            -- YYYY-MM-DD (UTC day label)
                ticker TEXT NOT NULL,
                mentions INTEGER NOT NULL,
                title TEXT,
                PRIMARY KEY (date, ticker)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS prices (
                date TEXT NOT NULL,            -- trading date (exchange calendar)
                ticker TEXT NOT NULL,
                close REAL NOT NULL,
                ret1d REAL,                    -- close-to-close daily return (%)
                PRIMARY KEY (date, ticker)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_mentions_ticker ON mentions(ticker, date)")
            .execute(&self.pool)
            .await?;

        info!("Database schema initialized successfully");
        Ok(())
    }

    /// Insert or update mention rows
    pub async fn upsert_mentions(&self, records: &[MentionRecord]) -> Result<usize, sqlx::Error> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut transaction = self.pool.begin().await?;
        let mut affected_rows = 0;

        for record in records {
            let result = sqlx::query(
                r#"
                INSERT INTO mentions (date, ticker, mentions, title)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(date, ticker) DO UPDATE SET
                    mentions = excluded.mentions,
                    title = COALESCE(excluded.title, mentions.title)
                "#,
            )
            .bind(&record.date)
            .bind(&record.ticker)
            .bind(record.mentions as i64)
            .bind(&record.title)
            .execute(&mut *transaction)
            .await?;

            affected_rows += result.rows_affected() as usize;
        }

        transaction.commit().await?;
        Ok(affected_rows)
    }

    /// Insert or update price rows
    pub async fn upsert_prices(&self, records: &[PriceRecord]) -> Result<usize, sqlx::Error> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut transaction = self.pool.begin().await?;
        let mut affected_rows = 0;

        for record in records {
            let result = sqlx::query(
                r#"
                INSERT INTO prices (date, ticker, close, ret1d)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(date, ticker) DO UPDATE SET
                    close = excluded.close,
                    ret1d = excluded.ret1d
                "#,
            )
            .bind(&record.date)
            .bind(&record.ticker)
            .bind(record.close)
            .bind(record.ret1d)
            .execute(&mut *transaction)
            .await?;

            affected_rows += result.rows_affected() as usize;
        }

        transaction.commit().await?;
        Ok(affected_rows)
    }

    /// Mention rows of one day label, most mentioned first
    pub async fn read_mentions(&self, date: &str) -> Result<Vec<MentionRecord>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT date, ticker, mentions, title FROM mentions WHERE date = ?1 ORDER BY mentions DESC, ticker ASC",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_mention).collect()
    }

    /// Mentions of one day left-joined with prices on `(date, ticker)`
    pub async fn read_join(&self, date: &str) -> Result<Vec<JoinedRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT m.date, m.ticker, m.mentions, m.title, p.close, p.ret1d
            FROM mentions m
            LEFT JOIN prices p ON p.date = m.date AND p.ticker = m.ticker
            WHERE m.date = ?1
            ORDER BY m.mentions DESC, m.ticker ASC
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_joined).collect()
    }

    /// Every stored day of one ticker, oldest first
    pub async fn read_ticker_history(&self, ticker: &str) -> Result<Vec<JoinedRow>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT m.date, m.ticker, m.mentions, m.title, p.close, p.ret1d
            FROM mentions m
            LEFT JOIN prices p ON p.date = m.date AND p.ticker = m.ticker
            WHERE m.ticker = ?1
            ORDER BY m.date ASC
            "#,
        )
        .bind(ticker)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_joined).collect()
    }

    /// Most recent day label with mentions
    pub async fn latest_date(&self) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT MAX(date) FROM mentions")
            .fetch_one(&self.pool)
            .await
    }

    /// Distinct tickers ever mentioned, sorted
    pub async fn list_tickers(&self) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT DISTINCT ticker FROM mentions ORDER BY ticker")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn stats(&self) -> Result<DatabaseStats, sqlx::Error> {
        let mention_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mentions")
            .fetch_one(&self.pool)
            .await?;

        let price_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prices")
            .fetch_one(&self.pool)
            .await?;

        let unique_tickers: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT ticker) FROM mentions")
            .fetch_one(&self.pool)
            .await?;

        let row = sqlx::query("SELECT MIN(date), MAX(date) FROM mentions")
            .fetch_one(&self.pool)
            .await?;
        let min: Option<String> = row.try_get(0)?;
        let max: Option<String> = row.try_get(1)?;

        Ok(DatabaseStats {
            mention_rows,
            price_rows,
            unique_tickers,
            date_range: min.zip(max),
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("SQLite database connection pool closed");
    }
}

fn row_to_mention(row: sqlx::sqlite::SqliteRow) -> Result<MentionRecord, sqlx::Error> {
    Ok(MentionRecord {
        date: row.try_get("date")?,
        ticker: row.try_get("ticker")?,
        mentions: row.try_get::<i64, _>("mentions")? as u64,
        title: row.try_get("title")?,
    })
}

fn row_to_joined(row: sqlx::sqlite::SqliteRow) -> Result<JoinedRow, sqlx::Error> {
    Ok(JoinedRow {
        date: row.try_get("date")?,
        ticker: row.try_get("ticker")?,
        mentions: row.try_get::<i64, _>("mentions")? as u64,
        title: row.try_get("title")?,
        close: row.try_get("close")?,
        ret1d: row.try_get("ret1d")?,
    })
}

/// Database statistics
#[derive(Debug)]
pub struct DatabaseStats {
    pub mention_rows: i64,
    pub price_rows: i64,
    pub unique_tickers: i64,
    pub date_range: Option<(String, String)>,
}
