//! Local memo timeline, persisted as one JSON document.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use inukadas_core::{Identified, MemoProcessingResult, SearchCandidate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A processed memo plus the text the user can edit afterwards
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    #[serde(flatten)]
    pub result: MemoProcessingResult,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Memo {
    pub fn new(result: MemoProcessingResult) -> Self {
        let content = result.original_text.clone();
        Self {
            result,
            content,
            updated_at: None,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.result.timestamp
    }
}

impl Identified for Memo {
    fn id(&self) -> &str {
        &self.result.id
    }
}

impl From<&Memo> for SearchCandidate {
    fn from(memo: &Memo) -> Self {
        SearchCandidate::from(&memo.result)
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct StoreFile {
    #[serde(default)]
    memos: Vec<Memo>,
}

pub struct MemoStore {
    path: PathBuf,
    memos: Vec<Memo>,
}

impl MemoStore {
    /// Opens the store at `path`; a missing file is an empty timeline
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let memos = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str::<StoreFile>(&content)?.memos
        } else {
            Vec::new()
        };

        debug!("Loaded {} memos from {}", memos.len(), path.display());
        Ok(Self { path, memos })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the timeline to a temp file next to the target and renames it over
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = StoreFile {
            memos: self.memos.clone(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn add(&mut self, memo: Memo) -> &Memo {
        self.memos.push(memo);
        &self.memos[self.memos.len() - 1]
    }

    /// All memos, newest first
    pub fn list(&self) -> Vec<&Memo> {
        let mut memos: Vec<&Memo> = self.memos.iter().collect();
        memos.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        memos
    }

    pub fn memos(&self) -> &[Memo] {
        &self.memos
    }

    pub fn get(&self, id: &str) -> Option<&Memo> {
        self.memos.iter().find(|memo| memo.id() == id)
    }

    pub fn update_content(&mut self, id: &str, content: &str) -> Result<&Memo, StoreError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(StoreError::EmptyContent);
        }

        let memo = self
            .memos
            .iter_mut()
            .find(|memo| memo.result.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        memo.content = content.to_string();
        memo.updated_at = Some(Utc::now());
        Ok(&*memo)
    }

    pub fn delete(&mut self, id: &str) -> Result<Memo, StoreError> {
        let index = self
            .memos
            .iter()
            .position(|memo| memo.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(self.memos.remove(index))
    }
}
