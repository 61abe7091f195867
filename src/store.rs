// ABOUTME: Local persistent key-value store for the darsy application
// ABOUTME: Autosave of the current lesson and the saved-lesson library

use crate::errors::{LessonError, Result};
use crate::lesson::{Lesson, SavedLesson};
use crate::utils;
use log::{debug, info};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key holding the lesson currently being worked on.
pub const AUTOSAVE_KEY: &str = "autosave_lesson";
/// Key holding the list of saved lessons.
pub const LESSONS_KEY: &str = "darsy_lessons";

/// JSON blob store addressed by string keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
    fn delete(&mut self, key: &str) -> Result<()>;
}

/// In-memory store, for tests and ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store with one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: &Path) -> Result<Self> {
        info!("Opening lesson store at {:?}", dir);
        utils::probe_store_dir(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(LessonError::PersistenceError(format!("Invalid store key: {}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| LessonError::PersistenceError(format!("Failed to read {:?}: {}", path, e)))?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let path = self.path_for(key)?;
        let content = serde_json::to_string_pretty(&value)?;
        // Write then rename so a failed write never leaves a truncated file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, content)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| LessonError::PersistenceError(format!("Failed to write {:?}: {}", path, e)))?;
        debug!("Stored key {}", key);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                LessonError::PersistenceError(format!("Failed to delete {:?}: {}", path, e))
            })?;
        }
        Ok(())
    }
}

/// Typed access to the autosave slot and the saved-lesson collection.
#[derive(Debug, Clone)]
pub struct LessonLibrary<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> LessonLibrary<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Saved lessons, newest first.
    pub fn list(&self) -> Result<Vec<SavedLesson>> {
        match self.store.get(LESSONS_KEY)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    pub fn find(&self, id: &str) -> Result<Option<SavedLesson>> {
        Ok(self.list()?.into_iter().find(|saved| saved.id == id))
    }

    pub fn save(&mut self, lesson: &Lesson, image_preview: Option<String>) -> Result<SavedLesson> {
        let saved = SavedLesson {
            id: uuid::Uuid::new_v4().to_string(),
            date: chrono::Utc::now().timestamp_millis(),
            data: lesson.clone(),
            image_preview,
        };
        let mut lessons = self.list()?;
        lessons.insert(0, saved.clone());
        self.store.set(LESSONS_KEY, serde_json::to_value(&lessons)?)?;
        info!("Saved lesson {:?} as {}", lesson.title, saved.id);
        Ok(saved)
    }

    /// Returns whether a lesson with this id existed.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let mut lessons = self.list()?;
        let before = lessons.len();
        lessons.retain(|saved| saved.id != id);
        if lessons.len() == before {
            return Ok(false);
        }
        self.store.set(LESSONS_KEY, serde_json::to_value(&lessons)?)?;
        info!("Deleted saved lesson {}", id);
        Ok(true)
    }

    pub fn autosave(&mut self, lesson: &Lesson) -> Result<()> {
        self.store.set(AUTOSAVE_KEY, serde_json::to_value(lesson)?)
    }

    pub fn load_autosave(&self) -> Result<Option<Lesson>> {
        match self.store.get(AUTOSAVE_KEY)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn discard_autosave(&mut self) -> Result<()> {
        self.store.delete(AUTOSAVE_KEY)
    }
}
