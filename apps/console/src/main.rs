use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use session_core::{
    PresentationSink, PresentationSynchronizer, PresentationView, RuntimeConfig, SessionRuntime,
    StateBus,
};
use shared::{
    domain::{WorkoutDefinition, WorkoutId},
    protocol::SessionPhase,
};
use storage::{MemoryWorkoutStore, SqliteWorkoutStore, WorkoutStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
struct Args {
    /// Workout to start as soon as the session is up.
    #[arg(long)]
    workout: Option<i64>,
    #[arg(long)]
    database_url: Option<String>,
    /// Insert the demo workouts before starting.
    #[arg(long)]
    seed: bool,
    /// Skip the database and use an in-memory store with the demo workouts.
    #[arg(long)]
    in_memory: bool,
}

struct ConsoleSink;

impl PresentationSink for ConsoleSink {
    fn render(&mut self, view: &PresentationView) {
        let status = match view.phase {
            SessionPhase::Running => "running",
            SessionPhase::Paused => "paused",
            SessionPhase::Expired => "done",
        };
        println!(
            "[{status:>7}] {}  {}  reps left: {}  ({} / {})",
            view.title,
            view.countdown,
            view.repetitions_remaining,
            view.primary.label,
            view.secondary.label
        );
    }
}

fn demo_workouts() -> Vec<WorkoutDefinition> {
    vec![
        WorkoutDefinition {
            id: WorkoutId(1),
            name: "Push Ups".into(),
            exercise_duration_millis: 30_000,
            repetitions: 5,
        },
        WorkoutDefinition {
            id: WorkoutId(2),
            name: "Squats".into(),
            exercise_duration_millis: 45_000,
            repetitions: 3,
        },
        WorkoutDefinition {
            id: WorkoutId(3),
            name: "Plank".into(),
            exercise_duration_millis: 60_000,
            repetitions: 1,
        },
    ]
}

async fn open_store(args: &Args, database_url: &str) -> Result<Arc<dyn WorkoutStore>> {
    if args.in_memory {
        let store = MemoryWorkoutStore::new();
        for workout in demo_workouts() {
            store.insert(workout);
        }
        return Ok(Arc::new(store));
    }

    let store = SqliteWorkoutStore::new(database_url)
        .await
        .with_context(|| format!("failed to open workout store at '{database_url}'"))?;
    if args.seed {
        for workout in demo_workouts() {
            store.insert_workout(&workout).await?;
        }
        info!("seeded demo workouts");
    }

    let available = store.list_workouts().await?;
    if available.is_empty() {
        println!("workout store is empty; run again with --seed or --in-memory");
    } else {
        println!("workouts:");
        for workout in &available {
            println!(
                "  {}  {}  {}s x {}",
                workout.id,
                workout.name,
                workout.exercise_duration_millis / 1_000,
                workout.repetitions
            );
        }
    }
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.database_url.clone() {
        settings.database_url = url;
    }

    let store = open_store(&args, &settings.database_url).await?;

    let bus = StateBus::new();
    let handle = SessionRuntime::spawn(
        store,
        bus,
        RuntimeConfig {
            tick_interval: Duration::from_millis(settings.tick_interval_millis),
            ..RuntimeConfig::default()
        },
    );

    let renderer = tokio::spawn(PresentationSynchronizer::new(handle.subscribe(), ConsoleSink).run());

    let router = handle.router();
    if let Some(id) = args.workout {
        router.dispatch_action(&format!("start:{id}"));
    }

    println!("commands: start:<id>  pause  resume  cancel  quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" => {}
            "quit" | "q" => break,
            action => router.dispatch_action(action),
        }
    }

    handle.shutdown().await?;
    renderer.await.context("presentation task")?;
    Ok(())
}
