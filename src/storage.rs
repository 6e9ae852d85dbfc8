use crate::error::StorageError;
use crate::types::{EventTime, Picture, PictureKind};
use log::info;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use unicode_normalization::UnicodeNormalization;

/// Outcome of persisting one attached picture.
#[derive(Debug)]
pub struct SavedPicture {
    pub kind: PictureKind,
    pub result: Result<PathBuf, StorageError>,
}

/// Lays pictures out as `<root>/<plate>/<YYYY-MM-DD_HH-MM-SS>/<filename>`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ImageStore { root: root.into() }
    }

    pub fn event_dir(&self, plate: &str, time: &EventTime) -> PathBuf {
        self.root
            .join(sanitize_component(plate))
            .join(time.folder_name())
    }

    /// Writes every picture, continuing past individual failures. The event
    /// directory is only touched when there is at least one picture.
    pub async fn save_all(
        &self,
        plate: &str,
        time: &EventTime,
        pictures: &[Picture],
    ) -> Vec<SavedPicture> {
        if pictures.is_empty() {
            return Vec::new();
        }

        let dir = self.event_dir(plate, time);
        let mut saved = Vec::with_capacity(pictures.len());
        if let Err(e) = ensure_dir(&dir).await {
            let mut first = Some(e);
            for picture in pictures {
                let err = first
                    .take()
                    .unwrap_or_else(|| StorageError::DirectoryUnavailable { path: dir.clone() });
                saved.push(SavedPicture {
                    kind: picture.kind,
                    result: Err(err),
                });
            }
            return saved;
        }

        for picture in pictures {
            saved.push(SavedPicture {
                kind: picture.kind,
                result: save_picture(&dir, picture).await,
            });
        }
        saved
    }
}

/// Creates the event directory. Returns whether this call created the leaf,
/// so the log line is written once even when requests race.
async fn ensure_dir(dir: &Path) -> Result<bool, StorageError> {
    let create_err = |source| StorageError::CreateDir {
        path: dir.to_path_buf(),
        source,
    };
    if let Some(parent) = dir.parent() {
        fs::create_dir_all(parent).await.map_err(create_err)?;
    }
    match fs::create_dir(dir).await {
        Ok(()) => {
            info!("Directory '{}' created successfully.", dir.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(create_err(e)),
    }
}

async fn save_picture(dir: &Path, picture: &Picture) -> Result<PathBuf, StorageError> {
    let filename = sanitize_filename(&picture.filename);
    if filename.is_empty() {
        return Err(StorageError::EmptyFilename {
            original: picture.filename.clone(),
        });
    }
    let path = dir.join(filename);
    fs::write(&path, &picture.data)
        .await
        .map_err(|source| StorageError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// Reduces a client filename to a single safe ASCII path component.
/// Accents are decomposed first so `café.jpg` keeps its `e`. May return an
/// empty string.
pub fn sanitize_filename(name: &str) -> String {
    let spaced: String = name
        .nfkd()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Makes a plate usable as a directory name. Non-latin plates keep their
/// characters.
fn sanitize_component(plate: &str) -> String {
    let mapped: String = plate
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = mapped.trim_matches('_');
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}
