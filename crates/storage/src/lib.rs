//! Workout definition storage.
//!
//! The engine only ever needs `lookup(id)`; everything else here exists so
//! an app can create, seed and inspect its local workout database.

use std::{collections::HashMap, fs, path::PathBuf, str::FromStr, sync::RwLock};

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use tracing::debug;

use shared::{
    domain::{WorkoutDefinition, WorkoutId},
    error::StoreError,
};

/// Read-only resolution of a workout id to its immutable definition.
///
/// Lookups are async-safe and may run off the engine's control thread.
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    async fn lookup(&self, id: WorkoutId) -> Result<WorkoutDefinition, StoreError>;
}

#[derive(Clone)]
pub struct SqliteWorkoutStore {
    pool: Pool<Sqlite>,
}

impl SqliteWorkoutStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;

        let store = Self { pool };
        store.ensure_workout_table().await?;
        Ok(store)
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

    async fn ensure_workout_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workouts (
                id                       INTEGER PRIMARY KEY,
                name                     TEXT NOT NULL,
                exercise_duration_millis INTEGER NOT NULL,
                repetitions              INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure workouts table exists")?;
        Ok(())
    }

    pub async fn insert_workout(&self, workout: &WorkoutDefinition) -> Result<()> {
        workout.validate()?;
        sqlx::query(
            "INSERT OR REPLACE INTO workouts (id, name, exercise_duration_millis, repetitions) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(workout.id.0)
        .bind(&workout.name)
        .bind(workout.exercise_duration_millis as i64)
        .bind(i64::from(workout.repetitions))
        .execute(&self.pool)
        .await
        .context("failed to insert workout")?;
        debug!(workout_id = workout.id.0, "stored workout definition");
        Ok(())
    }

    pub async fn get_workout(&self, id: WorkoutId) -> Result<Option<WorkoutDefinition>> {
        let row = sqlx::query(
            "SELECT id, name, exercise_duration_millis, repetitions FROM workouts WHERE id = ?1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .context("failed to query workout")?;

        row.map(workout_from_row).transpose()
    }

    pub async fn list_workouts(&self) -> Result<Vec<WorkoutDefinition>> {
        let rows = sqlx::query(
            "SELECT id, name, exercise_duration_millis, repetitions FROM workouts ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list workouts")?;

        rows.into_iter().map(workout_from_row).collect()
    }
}

fn workout_from_row(row: sqlx::sqlite::SqliteRow) -> Result<WorkoutDefinition> {
    let id: i64 = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let exercise_duration_millis: i64 = row.try_get("exercise_duration_millis")?;
    let repetitions: i64 = row.try_get("repetitions")?;

    Ok(WorkoutDefinition {
        id: WorkoutId(id),
        name,
        exercise_duration_millis: exercise_duration_millis
            .try_into()
            .context("stored exercise duration is negative")?,
        repetitions: repetitions
            .try_into()
            .context("stored repetition count is out of range")?,
    })
}

#[async_trait]
impl WorkoutStore for SqliteWorkoutStore {
    async fn lookup(&self, id: WorkoutId) -> Result<WorkoutDefinition, StoreError> {
        match self.get_workout(id).await {
            Ok(Some(workout)) => Ok(workout),
            Ok(None) => Err(StoreError::NotFound { id }),
            Err(err) => Err(StoreError::Backend(err)),
        }
    }
}

/// In-memory store for tests and database-free runs.
#[derive(Default)]
pub struct MemoryWorkoutStore {
    workouts: RwLock<HashMap<WorkoutId, WorkoutDefinition>>,
}

impl MemoryWorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, workout: WorkoutDefinition) {
        self.workouts
            .write()
            .expect("workout map lock poisoned")
            .insert(workout.id, workout);
    }
}

#[async_trait]
impl WorkoutStore for MemoryWorkoutStore {
    async fn lookup(&self, id: WorkoutId) -> Result<WorkoutDefinition, StoreError> {
        self.workouts
            .read()
            .expect("workout map lock poisoned")
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_file_path(database_url) else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create database directory {parent:?}"))?;
        }
    }
    Ok(())
}

fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    if rest.is_empty() || rest.starts_with(":memory:") {
        return None;
    }
    // Strip query parameters like ?mode=rwc.
    let rest = rest.split('?').next().unwrap_or(rest);
    Some(PathBuf::from(rest))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
