//! Save slot storage

use crate::record::SaveRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Record layout version written by this build
pub const SAVE_VERSION: u32 = 1;

/// Save system errors
#[derive(Debug, Error)]
pub enum SaveError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// Save written by a newer build
    #[error("Version mismatch: save version {0}, current version {1}")]
    VersionMismatch(u32, u32),
    /// Slot not found
    #[error("Save slot not found: {0}")]
    SlotNotFound(String),
    /// Record decoded but describes an impossible player
    #[error("Corrupted save data: {0}")]
    Corrupted(String),
}

/// Save file format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    /// JSON (human readable)
    #[default]
    Json,
    /// Binary (compact)
    Binary,
}

impl SaveFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Binary => "sav",
        }
    }
}

/// Summary of an occupied slot
#[derive(Debug, Clone, PartialEq)]
pub struct SaveSlot {
    /// Slot identifier
    pub id: String,
    /// File path
    pub path: PathBuf,
    pub player_name: String,
    pub level: u32,
    /// Unix seconds
    pub timestamp: u64,
}

impl SaveSlot {
    fn from_record(id: impl Into<String>, path: impl Into<PathBuf>, record: &SaveRecord) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            player_name: record.player_name.clone(),
            level: record.level,
            timestamp: record.timestamp,
        }
    }
}

/// Reads and writes save records under one directory
pub struct SaveManager {
    save_dir: PathBuf,
    format: SaveFormat,
    version: u32,
}

impl SaveManager {
    /// Create a new save manager
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            format: SaveFormat::default(),
            version: SAVE_VERSION,
        }
    }

    /// Set save format
    pub fn with_format(mut self, format: SaveFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the newest version this manager accepts
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    pub fn format(&self) -> SaveFormat {
        self.format
    }

    /// Ensure save directory exists
    pub fn ensure_dir(&self) -> Result<(), SaveError> {
        fs::create_dir_all(&self.save_dir)?;
        Ok(())
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.save_dir.join(format!("{}.{}", slot, self.format.extension()))
    }

    fn encode(&self, record: &SaveRecord) -> Result<Vec<u8>, SaveError> {
        match self.format {
            SaveFormat::Json => {
                serde_json::to_vec_pretty(record).map_err(|e| SaveError::Serialization(e.to_string()))
            }
            SaveFormat::Binary => bincode::serialize(record).map_err(|e| SaveError::Serialization(e.to_string())),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<SaveRecord, SaveError> {
        match self.format {
            SaveFormat::Json => {
                serde_json::from_slice(bytes).map_err(|e| SaveError::Deserialization(e.to_string()))
            }
            SaveFormat::Binary => bincode::deserialize(bytes).map_err(|e| SaveError::Deserialization(e.to_string())),
        }
    }

    /// Write a record to a slot, replacing any previous save
    pub fn save(&self, slot: &str, record: &SaveRecord) -> Result<PathBuf, SaveError> {
        self.ensure_dir()?;
        let path = self.slot_path(slot);
        fs::write(&path, self.encode(record)?)?;
        log::info!(
            "Saved {} (lv {}) to {}",
            record.player_name,
            record.level,
            path.display()
        );
        Ok(path)
    }

    /// Read a record from a slot
    pub fn load(&self, slot: &str) -> Result<SaveRecord, SaveError> {
        let path = self.slot_path(slot);
        if !path.exists() {
            return Err(SaveError::SlotNotFound(slot.to_string()));
        }

        let record = self.decode(&fs::read(&path)?)?;
        if record.version > self.version {
            return Err(SaveError::VersionMismatch(record.version, self.version));
        }
        log::info!("Loaded {} from {}", record.player_name, path.display());
        Ok(record)
    }

    /// Delete a save slot; deleting an empty slot is not an error
    pub fn delete(&self, slot: &str) -> Result<(), SaveError> {
        let path = self.slot_path(slot);
        if path.exists() {
            fs::remove_file(&path)?;
            log::debug!("Deleted save slot {}", slot);
        }
        Ok(())
    }

    /// Check if slot exists
    pub fn exists(&self, slot: &str) -> bool {
        self.slot_path(slot).exists()
    }

    /// List readable slots of this manager's format, newest first
    ///
    /// Files that fail to decode are skipped with a warning.
    pub fn list_slots(&self) -> Result<Vec<SaveSlot>, SaveError> {
        self.ensure_dir()?;
        let ext = self.format.extension();
        let mut slots = Vec::new();

        for entry in fs::read_dir(&self.save_dir)? {
            let path = entry?.path();
            if !path.extension().map(|e| e == ext).unwrap_or(false) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match fs::read(&path).map_err(SaveError::from).and_then(|b| self.decode(&b)) {
                Ok(record) => slots.push(SaveSlot::from_record(stem, &path, &record)),
                Err(e) => log::warn!("Skipping unreadable save {}: {}", path.display(), e),
            }
        }

        slots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(slots)
    }

    /// Save to the "quicksave" slot
    pub fn quicksave(&self, record: &SaveRecord) -> Result<PathBuf, SaveError> {
        self.save("quicksave", record)
    }

    /// Load the "quicksave" slot
    pub fn quickload(&self) -> Result<SaveRecord, SaveError> {
        self.load("quicksave")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metal_combat::PlayerCharacter;
    use std::env::temp_dir;

    fn scratch(name: &str) -> PathBuf {
        let dir = temp_dir().join(format!("metal_save_unit_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(SaveFormat::Json.extension(), "json");
        assert_eq!(SaveFormat::Binary.extension(), "sav");
    }

    #[test]
    fn test_missing_slot() {
        let dir = scratch("missing");
        let manager = SaveManager::new(&dir);
        assert!(matches!(manager.load("nope"), Err(SaveError::SlotNotFound(_))));
        assert!(manager.delete("nope").is_ok());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = scratch("version");
        let manager = SaveManager::new(&dir);
        let mut record = SaveRecord::capture(&PlayerCharacter::new("Hero"));
        record.version = SAVE_VERSION + 1;
        manager.save("future", &record).unwrap();

        assert!(matches!(
            manager.load("future"),
            Err(SaveError::VersionMismatch(v, c)) if v == SAVE_VERSION + 1 && c == SAVE_VERSION
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_garbage_file_is_deserialization_error() {
        let dir = scratch("garbage");
        let manager = SaveManager::new(&dir).with_format(SaveFormat::Json);
        manager.ensure_dir().unwrap();
        fs::write(dir.join("broken.json"), b"{ not json").unwrap();

        assert!(matches!(manager.load("broken"), Err(SaveError::Deserialization(_))));
        assert!(manager.list_slots().unwrap().is_empty());
        let _ = fs::remove_dir_all(&dir);
    }
}
