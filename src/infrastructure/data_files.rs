// Data directory management: list, store and delete the files the device
// serves, log.csv among them
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataFileError {
    #[error("invalid file name {0:?}")]
    InvalidName(String),

    #[error("file {0} does not exist")]
    Missing(String),

    #[error("{action} {name} failed")]
    Io {
        action: &'static str,
        name: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct DataFiles {
    root: PathBuf,
}

impl DataFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File names at the top of the data directory, sorted.
    pub async fn list(&self) -> Result<Vec<String>, DataFileError> {
        let io_error = |source: io::Error| DataFileError::Io {
            action: "listing",
            name: self.root.display().to_string(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(io_error)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let is_file = entry.file_type().await.map_err(io_error)?.is_file();
            if is_file {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Write `contents` to `name`, replacing any existing file.
    pub async fn store(&self, name: &str, contents: &[u8]) -> Result<(), DataFileError> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| DataFileError::Io {
                action: "writing",
                name: name.to_string(),
                source,
            })?;
        tracing::info!("Stored {} ({} bytes)", path.display(), contents.len());
        Ok(())
    }

    pub async fn delete(&self, name: &str) -> Result<(), DataFileError> {
        let path = self.resolve(name)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(DataFileError::Missing(name.to_string()));
        }
        tokio::fs::remove_file(&path)
            .await
            .map_err(|source| DataFileError::Io {
                action: "removing",
                name: name.to_string(),
                source,
            })?;
        tracing::info!("Deleted {}", path.display());
        Ok(())
    }

    /// Names are single entries in the data directory. A leading `/` is
    /// accepted, as the device addresses its files as `/log.csv`.
    fn resolve(&self, name: &str) -> Result<PathBuf, DataFileError> {
        let invalid = || DataFileError::InvalidName(name.to_string());
        let mut components = Path::new(name.trim_start_matches('/')).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) => Ok(self.root.join(file)),
            _ => Err(invalid()),
        }
    }
}

/// The device's listing format: `[a, b, c]`.
pub fn format_listing(names: &[String]) -> String {
    format!("[{}]", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("power_graph_{}_{}", name, std::process::id()));
        std::fs::create_dir_all(dir.join("docs")).unwrap();
        std::fs::write(dir.join("log.csv"), "1000,1\n").unwrap();
        std::fs::write(dir.join("index.htm"), "<p></p>").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_list_files_only() {
        let dir = data_dir("list");
        let names = DataFiles::new(&dir).list().await.unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(names, vec!["index.htm".to_string(), "log.csv".to_string()]);
        assert_eq!(format_listing(&names), "[index.htm, log.csv]");
    }

    #[tokio::test]
    async fn test_list_missing_directory() {
        let files = DataFiles::new("/definitely/not/a/power_graph/dir");
        assert!(matches!(files.list().await, Err(DataFileError::Io { .. })));
    }

    #[test]
    fn test_format_empty_listing() {
        assert_eq!(format_listing(&[]), "[]");
    }

    #[tokio::test]
    async fn test_store_then_delete() {
        let dir = data_dir("store");
        let files = DataFiles::new(&dir);

        files.store("/notes.txt", b"hello").await.unwrap();
        let stored = std::fs::read_to_string(dir.join("notes.txt")).unwrap();
        files.delete("notes.txt").await.unwrap();
        let exists = dir.join("notes.txt").exists();
        let again = files.delete("notes.txt").await;
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(stored, "hello");
        assert!(!exists);
        assert!(matches!(again, Err(DataFileError::Missing(_))));
    }

    #[tokio::test]
    async fn test_rejects_names_outside_data_dir() {
        let files = DataFiles::new("data");

        for name in ["../log.csv", "/docs/../../x", "docs/index.htm", "", "/"] {
            assert!(
                matches!(files.delete(name).await, Err(DataFileError::InvalidName(_))),
                "{name:?} accepted"
            );
        }
        assert!(matches!(
            files.store("..", b"x").await,
            Err(DataFileError::InvalidName(_))
        ));
    }
}
