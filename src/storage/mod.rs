//! Local storage for finished-game scores
//!
//! Stores data in:
//! - Linux: ~/.local/share/chroma-recall/
//! - macOS: ~/Library/Application Support/com.forgemypc.chroma-recall/
//! - Windows: %APPDATA%/forgemypc/chroma-recall/data/

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const SCORES_FILE: &str = "scores.json";
const LOG_FILE: &str = "chroma-recall.log";

/// Oldest low scores are dropped past this many records.
const MAX_RECORDS: usize = 1000;

pub const TOP_TEN: usize = 10;

/// One finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: Uuid,
    pub username: String,
    pub score: u64,
    pub level: u32,
    pub recorded_at: DateTime<Utc>,
}

/// Where a freshly saved score landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    /// 1-based position on the full leaderboard.
    pub rank: usize,
    pub is_top_ten: bool,
}

/// Persistence boundary for scores.
pub trait ScoreStore {
    fn save_score(&self, username: &str, score: u64, level: u32) -> Result<SaveOutcome>;

    /// Highest scores first; ties go to the earlier record.
    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>>;
}

/// Local storage manager for chroma-recall data
pub struct LocalStorage {
    data_dir: PathBuf,
}

impl LocalStorage {
    /// Initialize local storage, creating directories if needed
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", "forgemypc", "chroma-recall")
            .context("Could not determine project directories")?;
        Self::at(proj_dirs.data_dir())
    }

    /// Storage rooted at an explicit directory.
    pub fn at(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
        Ok(Self { data_dir })
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// File the TUI writes its tracing output to.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    fn scores_path(&self) -> PathBuf {
        self.data_dir.join(SCORES_FILE)
    }

    /// Best recorded score for `username`, if any.
    pub fn personal_best(&self, username: &str) -> Result<Option<u64>> {
        let username = sanitize_username(username)?;
        Ok(self
            .load_records()?
            .iter()
            .filter(|record| record.username == username)
            .map(|record| record.score)
            .max())
    }

    fn load_records(&self) -> Result<Vec<ScoreRecord>> {
        let path = self.scores_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scores from {}", path.display()))?;

        match serde_json::from_str::<Vec<ScoreRecord>>(&content) {
            Ok(mut records) => {
                sort_leaderboard(&mut records);
                Ok(records)
            }
            Err(err) => {
                warn!(path = %path.display(), "score file is corrupt, starting fresh: {err}");
                quarantine_corrupt_scores(&path).with_context(|| {
                    format!("Failed to move corrupt score file {}", path.display())
                })?;
                Ok(Vec::new())
            }
        }
    }

    fn write_records(&self, records: &[ScoreRecord]) -> Result<()> {
        let path = self.scores_path();
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(records).context("Failed to serialize scores")?;

        let mut file = open_private_file_overwrite(&tmp_path)
            .with_context(|| format!("Failed to create score file at {}", tmp_path.display()))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("Failed to write scores to {}", tmp_path.display()))?;
        drop(file);

        fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to replace score file {}", path.display()))?;
        Ok(())
    }
}

impl ScoreStore for LocalStorage {
    fn save_score(&self, username: &str, score: u64, level: u32) -> Result<SaveOutcome> {
        let username = sanitize_username(username)?;
        let mut records = self.load_records()?;

        let record = ScoreRecord {
            id: Uuid::new_v4(),
            username,
            score,
            level,
            recorded_at: Utc::now(),
        };
        let id = record.id;
        records.push(record);
        sort_leaderboard(&mut records);

        let rank = records
            .iter()
            .position(|r| r.id == id)
            .map(|index| index + 1)
            .unwrap_or(records.len());

        records.truncate(MAX_RECORDS);
        self.write_records(&records)?;

        debug!(score, level, rank, "score saved");
        Ok(SaveOutcome {
            rank,
            is_top_ten: rank <= TOP_TEN,
        })
    }

    fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>> {
        let mut records = self.load_records()?;
        records.truncate(limit);
        Ok(records)
    }
}

fn sort_leaderboard(records: &mut [ScoreRecord]) {
    records.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.recorded_at.cmp(&b.recorded_at))
    });
}

fn sanitize_username(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        anyhow::bail!("Username cannot be empty");
    }
    if trimmed.chars().count() > 32 {
        anyhow::bail!("Username is too long (max 32 characters)");
    }
    if trimmed.chars().any(char::is_control) {
        anyhow::bail!("Username contains control characters");
    }
    Ok(trimmed.to_string())
}

fn quarantine_corrupt_scores(path: &Path) -> std::io::Result<()> {
    let invalid_path = path.with_extension("invalid");
    fs::rename(path, &invalid_path).or_else(|_| fs::remove_file(path))
}

fn open_private_file_overwrite(path: &Path) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(temp_dir: &TempDir) -> LocalStorage {
        LocalStorage {
            data_dir: temp_dir.path().to_path_buf(),
        }
    }

    #[test]
    fn test_empty_store_has_no_scores() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        assert!(storage.top_scores(10).unwrap().is_empty());
        assert_eq!(storage.personal_best("ada").unwrap(), None);
    }

    #[test]
    fn test_save_reports_rank() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        let first = storage.save_score("ada", 500, 4).unwrap();
        assert_eq!(first, SaveOutcome { rank: 1, is_top_ten: true });

        let second = storage.save_score("grace", 900, 7).unwrap();
        assert_eq!(second.rank, 1);

        let third = storage.save_score("linus", 100, 1).unwrap();
        assert_eq!(third.rank, 3);

        let top = storage.top_scores(10).unwrap();
        let scores: Vec<u64> = top.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![900, 500, 100]);
        assert_eq!(top[0].username, "grace");
        assert_eq!(top[0].level, 7);
    }

    #[test]
    fn test_ties_rank_behind_earlier_scores() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        storage.save_score("ada", 300, 3).unwrap();
        let tie = storage.save_score("grace", 300, 3).unwrap();
        assert_eq!(tie.rank, 2);
        assert_eq!(storage.top_scores(1).unwrap()[0].username, "ada");
    }

    #[test]
    fn test_eleventh_place_is_not_top_ten() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        for i in 0..10 {
            storage.save_score("ada", 1000 + i, 5).unwrap();
        }
        let outcome = storage.save_score("grace", 10, 1).unwrap();
        assert_eq!(outcome.rank, 11);
        assert!(!outcome.is_top_ten);
        assert_eq!(storage.top_scores(5).unwrap().len(), 5);
    }

    #[test]
    fn test_personal_best_per_user() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);

        storage.save_score("ada", 200, 2).unwrap();
        storage.save_score("ada", 700, 6).unwrap();
        storage.save_score("grace", 900, 8).unwrap();

        assert_eq!(storage.personal_best("ada").unwrap(), Some(700));
        assert_eq!(storage.personal_best("  grace ").unwrap(), Some(900));
        assert_eq!(storage.personal_best("linus").unwrap(), None);
    }

    #[test]
    fn test_scores_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        storage(&temp_dir).save_score("ada", 420, 4).unwrap();

        let reopened = LocalStorage::at(temp_dir.path()).unwrap();
        let top = reopened.top_scores(10).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].score, 420);
        assert!(!temp_dir.path().join("scores.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_quarantined() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        fs::write(temp_dir.path().join(SCORES_FILE), "{ not json").unwrap();

        assert!(storage.top_scores(10).unwrap().is_empty());
        assert!(temp_dir.path().join("scores.invalid").exists());

        let outcome = storage.save_score("ada", 50, 1).unwrap();
        assert_eq!(outcome.rank, 1);
    }

    #[test]
    fn test_rejects_invalid_username() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage(&temp_dir);
        assert!(storage.save_score("   ", 10, 1).is_err());
        assert!(storage.save_score(&"x".repeat(33), 10, 1).is_err());
        assert!(storage.save_score("bad\nname", 10, 1).is_err());
    }
}
