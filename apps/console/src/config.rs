use std::collections::HashMap;

#[derive(Debug)]
pub struct Settings {
    pub database_url: String,
    pub tick_interval_millis: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://./data/workouts.db".into(),
            tick_interval_millis: 100,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = std::fs::read_to_string("console.toml") {
        apply_file_config(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Ok(v) = std::env::var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Ok(v) = std::env::var("APP__TICK_INTERVAL_MILLIS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.tick_interval_millis = parsed;
        }
    }

    settings
}

fn apply_file_config(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("database_url") {
            settings.database_url = v.clone();
        }
        if let Some(v) = file_cfg.get("tick_interval_millis") {
            if let Ok(parsed) = v.parse::<u64>() {
                settings.tick_interval_millis = parsed;
            }
        }
    }
}
