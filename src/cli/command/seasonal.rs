use std::path::Path;

use anyhow::Result;

use crate::{cli::{clear_on_error, create_spinner}, config::FileConfig, parquet, transform::seasonal_means};

use super::{make_parquet_file_name, read_options};

pub fn seasonal(
    observation: &Path,
    output: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<String> {
    let file_config = FileConfig::discover(config_path)?;
    let options = read_options(&file_config)?;

    let bar = create_spinner("Computing seasonal means...".to_string());
    let seasonal = parquet::read_observation(observation, &options)
        .and_then(|series| Ok(seasonal_means(&series)?));
    let seasonal = clear_on_error(&bar, seasonal)?;
    bar.finish_with_message(format!("{} seasonal means computed", seasonal.len()));

    let file_path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| make_parquet_file_name("seasonal"));
    parquet::save_observation(&seasonal, &file_path)?;

    Ok(file_path.to_string_lossy().to_string())
}

// -- Tests -------------------------------------------------------------------
