use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
};

use eyre::{Context as _, Result};
use tempfile::NamedTempFile;

use crate::model::TrophyResults;

/// Snapshot of every player's trophies.
///
/// The existence of the file is the only thing deciding whether trophies
/// are loaded from it or requested anew; it is never refreshed.
pub struct Cache {
    path: PathBuf,
}

impl Cache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` if there is no snapshot yet.
    pub fn load(&self) -> Result<Option<TrophyResults>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to open cache file `{}`", self.path.display())
                })
            }
        };

        serde_yaml::from_reader(BufReader::new(file))
            .map(Some)
            .with_context(|| format!("failed to deserialize cache file `{}`", self.path.display()))
    }

    /// Replaces the snapshot as a whole; on failure the previous file, if any,
    /// is left untouched.
    pub fn store(&self, trophies: &TrophyResults) -> Result<()> {
        self.replace_with(|writer| {
            serde_yaml::to_writer(writer, trophies).context("failed to serialize trophies")
        })
    }

    /// Writes into a temporary file next to the cache which is only moved
    /// into place once `write` succeeded.
    fn replace_with<F>(&self, write: F) -> Result<()>
    where
        F: FnOnce(&mut BufWriter<&mut File>) -> Result<()>,
    {
        let dir = match self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            Some(dir) => {
                fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create directory `{}`", dir.display()))?;

                dir
            }
            None => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir).with_context(|| {
            format!("failed to create temporary file in `{}`", dir.display())
        })?;

        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;

        writer
            .flush()
            .with_context(|| format!("failed to write cache file `{}`", self.path.display()))?;

        drop(writer);

        temp.persist(&self.path)
            .with_context(|| format!("failed to persist cache file `{}`", self.path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use crate::model::TrophyRecord;

    use super::*;

    fn results() -> TrophyResults {
        let solo = TrophyRecord {
            timestamp: datetime!(2023-05-12 17:04:12.5 +2),
            achievement_type: "SoloRanking - SeasonalCampaign".to_owned(),
            count: 1935,
            data: json!({
                "timestamp": "2023-05-12T17:04:12.5+02:00",
                "achievement": {
                    "trophyAchievementType": "SoloRanking",
                    "trophySoloRankingAchievementType": "SeasonalCampaign",
                },
                "counts": [5, 13, 18, 0, 0, 0, 0, 0, 0],
            }),
        };

        let live = TrophyRecord {
            timestamp: datetime!(2023-01-02 3:04:05 UTC),
            achievement_type: "LiveMatch".to_owned(),
            count: 4000,
            data: json!({ "nested": { "list": [1, "two", null, true, 2.5] } }),
        };

        let mut results = TrophyResults::new();
        results.insert("jmal".to_owned(), vec![solo, live.clone()]);
        results.insert("sampleses".to_owned(), vec![live]);
        results.insert("nobody".to_owned(), Vec::new());

        results
    }

    #[test]
    fn missing_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().join("cached.yml"));

        assert!(cache.load().unwrap().is_none());
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().join("nested").join("cached.yml"));
        let results = results();

        cache.store(&results).unwrap();
        let loaded = cache.load().unwrap().unwrap();

        assert_eq!(loaded, results);
    }

    #[test]
    fn failed_store_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().join("cached.yml"));

        let res = cache.replace_with(|writer| {
            writer.write_all(b"jmal:\n  - timestamp: 2023-")?;

            bail!("disk full")
        });

        assert!(res.is_err());
        assert!(cache.load().unwrap().is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_store_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Cache::new(dir.path().join("cached.yml"));
        let results = results();

        cache.store(&results).unwrap();

        let res = cache.replace_with(|writer| {
            writer.write_all(b"garbage")?;

            bail!("disk full")
        });

        assert!(res.is_err());
        assert_eq!(cache.load().unwrap().unwrap(), results);
    }

    #[test]
    fn malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cached.yml");
        fs::write(&path, "jmal: [not, records]").unwrap();

        assert!(Cache::new(path).load().is_err());
    }
}
