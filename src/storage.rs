use crate::errors::AppError;
use crate::models::MoodStore;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, info};

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/moods.json"))
}

pub fn resolve_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080)
}

/// Loads the store, starting empty when the file is missing or unreadable.
pub async fn load_store(path: &Path) -> MoodStore {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return MoodStore::default(),
        Err(err) => {
            error!(path = %path.display(), "failed to read data file: {err}");
            return MoodStore::default();
        }
    };

    serde_json::from_slice::<MoodStore>(&bytes)
        .inspect(|store| info!(entries = store.entries.len(), "loaded mood store"))
        .unwrap_or_else(|err| {
            error!(path = %path.display(), "failed to parse data file: {err}");
            MoodStore::default()
        })
}

/// Writes the whole store next to `path` and renames it into place, so a
/// failed write never leaves a half-written data file behind.
pub async fn persist_store(path: &Path, store: &MoodStore) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(store).map_err(AppError::internal)?;
    let staging = staging_path(path);
    fs::write(&staging, payload).await?;
    if let Err(err) = fs::rename(&staging, path).await {
        let _ = fs::remove_file(&staging).await;
        return Err(err.into());
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
