use crate::error::{Error, Result};
use crate::timeline::Timeline;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

const INDENT: &[u8] = b"    ";

/// Serializes with 4-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Writes the accumulated timeline to disk, plus an optional raw copy.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    raw_out: Option<PathBuf>,
}

impl OutputWriter {
    pub fn new(raw_out: Option<PathBuf>) -> Self {
        Self { raw_out }
    }

    /// Creates or truncates `path`. The parent directory must already exist.
    pub async fn write(&self, path: &Path, timeline: &Timeline) -> Result<()> {
        let bytes = to_pretty_json(timeline)?;
        write_file(path, &bytes).await?;
        info!(path = %path.display(), posts = timeline.len(), "wrote timeline");

        if let Some(raw) = &self.raw_out {
            write_file(raw, &bytes).await?;
            info!(path = %raw.display(), "wrote raw copy");
        }
        Ok(())
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes).await.map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads a previously written timeline file.
pub fn read_timeline(path: &Path) -> Result<Timeline> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// `<dir>/out-<username>_<n>.json` with `n` one past the highest existing index.
pub fn next_output_path(dir: &Path, username: &str) -> Result<PathBuf> {
    let prefix = format!("out-{}_", username);
    let highest = std::fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            name.strip_prefix(&prefix)?
                .strip_suffix(".json")?
                .parse::<u64>()
                .ok()
        })
        .max()
        .unwrap_or(0);

    let next = highest.checked_add(1).ok_or_else(|| {
        Error::Config(format!(
            "no free output index for `{}` in {}; pass an explicit output path",
            username,
            dir.display()
        ))
    })?;
    Ok(dir.join(format!("{}{}.json", prefix, next)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ReferenceKind, ReferencedTweet, TweetPublicMetrics};
    use crate::testing::{page_meta, tweets};
    use chrono::TimeZone;

    fn sample() -> Timeline {
        let mut data = tweets(2000, 3);
        data[0].created_at = Some(chrono::Utc.with_ymd_and_hms(2022, 4, 20, 9, 30, 0).unwrap());
        data[0].source = Some("Twitter Web App".to_string());
        data[1].referenced_tweets = Some(vec![ReferencedTweet {
            kind: ReferenceKind::Quoted,
            id: "17".to_string(),
        }]);
        data[2].public_metrics = Some(TweetPublicMetrics {
            like_count: 4,
            ..TweetPublicMetrics::default()
        });
        Timeline::from_page(data, page_meta(3, None, "2000", "1998"))
    }

    #[tokio::test]
    async fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let timeline = sample();

        OutputWriter::new(None).write(&path, &timeline).await.unwrap();

        let loaded = read_timeline(&path).unwrap();
        assert_eq!(loaded, timeline);
    }

    #[tokio::test]
    async fn test_output_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        OutputWriter::new(None).write(&path, &sample()).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"data\": [\n        {\n"));
        assert!(text.contains("\"type\": \"quoted\""));
    }

    #[tokio::test]
    async fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "x".repeat(10_000)).unwrap();

        OutputWriter::new(None).write(&path, &sample()).await.unwrap();
        assert_eq!(read_timeline(&path).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_raw_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let raw = dir.path().join("raw.json");

        OutputWriter::new(Some(raw.clone()))
            .write(&path, &sample())
            .await
            .unwrap();
        assert_eq!(
            std::fs::read(&path).unwrap(),
            std::fs::read(&raw).unwrap()
        );
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");

        let err = OutputWriter::new(None)
            .write(&path, &sample())
            .await
            .unwrap_err();
        match err {
            Error::Io { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_next_output_path() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            next_output_path(dir.path(), "alice").unwrap(),
            dir.path().join("out-alice_1.json")
        );

        for name in ["out-alice_2.json", "out-alice_3.json", "out-bob_9.json", "out-alice_x.json"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        assert_eq!(
            next_output_path(dir.path(), "alice").unwrap(),
            dir.path().join("out-alice_4.json")
        );
    }

    #[test]
    fn test_next_output_path_large_indices() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("out-alice_4294967295.json"), "{}").unwrap();
        assert_eq!(
            next_output_path(dir.path(), "alice").unwrap(),
            dir.path().join("out-alice_4294967296.json")
        );

        std::fs::write(dir.path().join(format!("out-alice_{}.json", u64::MAX)), "{}").unwrap();
        assert!(matches!(
            next_output_path(dir.path(), "alice"),
            Err(Error::Config(_))
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_next_output_path_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("data");
        assert_eq!(
            next_output_path(&missing, "alice").unwrap(),
            missing.join("out-alice_1.json")
        );
    }
}
