pub mod score;
pub mod seasonal;

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Datelike, Local};
pub use score::score;
pub use seasonal::seasonal;

use crate::{calendar::Calendar, config::FileConfig, parquet::ReadOptions};

pub fn make_parquet_file_name(label: &str) -> PathBuf {
    let today = Local::now();
    let file_name = format!(
        "s2s-skill-{}-{}-{:02}-{:02}.parquet",
        label.to_lowercase(),
        today.year(),
        today.month(),
        today.day()
    );

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(file_name)
}

fn read_options(config: &FileConfig) -> Result<ReadOptions> {
    let calendar = match &config.calendar {
        Some(attr) => Calendar::from_cf_attr(attr)?,
        None => Calendar::default(),
    };

    Ok(ReadOptions {
        columns: config.columns.clone(),
        calendar,
    })
}

// -- Tests -------------------------------------------------------------------
