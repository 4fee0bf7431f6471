use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::{domain::CommandId, protocol::CommandRecord};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCommand {
    pub command_id: CommandId,
    pub command: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<StoredCommand> for CommandRecord {
    fn from(value: StoredCommand) -> Self {
        Self {
            id: value.command_id,
            command: value.command,
        }
    }
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite url '{database_url}'"))?
            .create_if_missing(true);
        // Every in-memory connection is its own database, so pin the pool to one.
        let max_connections = if is_in_memory(database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::debug!(%database_url, "command log storage ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn store_command(&self, command: &str) -> Result<CommandId> {
        let rec = sqlx::query("INSERT INTO commands (command) VALUES (?) RETURNING id")
            .bind(command)
            .fetch_one(&self.pool)
            .await
            .context("failed to insert command")?;
        Ok(CommandId(rec.get::<i64, _>(0)))
    }

    pub async fn list_commands(&self) -> Result<Vec<StoredCommand>> {
        let rows = sqlx::query("SELECT id, command, created_at FROM commands ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .context("failed to list commands")?;
        Ok(rows
            .into_iter()
            .map(|r| StoredCommand {
                command_id: CommandId(r.get::<i64, _>("id")),
                command: r.get::<String, _>("command"),
                created_at: r
                    .get::<Option<String>, _>("created_at")
                    .as_deref()
                    .and_then(parse_timestamp),
            })
            .collect())
    }

    pub async fn count_commands(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM commands")
            .fetch_one(&self.pool)
            .await
            .context("failed to count commands")?;
        Ok(count)
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_in_memory(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
