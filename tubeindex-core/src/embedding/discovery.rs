//! Model cache discovery utilities
//!
//! Picks the directory fastembed downloads its ONNX model into.

use crate::error::{IndexError, Result};
use std::path::{Path, PathBuf};

/// Find the model cache directory with priority:
/// 1. Explicit path (CLI flag)
/// 2. TUBEINDEX_MODELS_PATH environment variable
/// 3. User home directory (~/.tubeindex/models)
///
/// The directory is created if it does not exist yet.
pub fn find_model_cache_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    let path = resolve_model_cache_dir(
        explicit,
        std::env::var_os("TUBEINDEX_MODELS_PATH").map(PathBuf::from),
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from),
    )?;

    std::fs::create_dir_all(&path).map_err(|e| {
        IndexError::invalid_path(format!("{}: {}", path.display(), e))
    })?;
    log::info!("Using model cache: {}", path.display());
    Ok(path)
}

fn resolve_model_cache_dir(
    explicit: Option<&Path>,
    env_path: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = env_path.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }

    if let Some(home) = home {
        return Ok(home.join(".tubeindex").join("models"));
    }

    Err(IndexError::model(
        "Model cache directory not found. Checked:\n\
         - --models-dir flag\n\
         - TUBEINDEX_MODELS_PATH environment variable\n\
         - ~/.tubeindex/models",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let path = resolve_model_cache_dir(
            Some(Path::new("/opt/models")),
            Some(PathBuf::from("/env/models")),
            Some(PathBuf::from("/home/me")),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/opt/models"));
    }

    #[test]
    fn test_env_before_home() {
        let path =
            resolve_model_cache_dir(None, Some(PathBuf::from("/env/models")), Some("/h".into()))
                .unwrap();
        assert_eq!(path, PathBuf::from("/env/models"));
    }

    #[test]
    fn test_home_fallback() {
        let path = resolve_model_cache_dir(None, Some(PathBuf::new()), Some("/home/me".into()))
            .unwrap();
        assert!(path.ends_with(".tubeindex/models"));
    }

    #[test]
    fn test_nothing_available() {
        let err = resolve_model_cache_dir(None, None, None).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_explicit_dir_is_created() {
        let temp = tempfile::TempDir::new().unwrap();
        let target = temp.path().join("nested").join("models");
        let path = find_model_cache_dir(Some(&target)).unwrap();
        assert!(path.is_dir());
    }
}
