use crate::errors::StorageError;
use crate::models::AppData;
use std::path::Path;
use tokio::fs;
use tracing::{error, warn};

pub fn parse_data(bytes: &[u8]) -> Result<AppData, StorageError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Missing or unreadable files load as empty data; a corrupt file is
/// discarded rather than surfaced.
pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match parse_data(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!(path = %path.display(), "{err}");
                if let Err(err) = fs::remove_file(path).await {
                    warn!("failed to discard corrupt data file: {err}");
                }
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("{}", StorageError::Io(err));
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), StorageError> {
    let payload = serde_json::to_vec_pretty(data)?;
    fs::write(path, payload).await?;
    Ok(())
}
