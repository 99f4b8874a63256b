//! JSON 文件存储
//!
//! 整个文件是一个 JSON 对象：`{ "<key>": [ {id, text, checked?}, ... ], ... }`，
//! 每个存储键对应一个文档。

use block_editor_core::{Document, DocumentStore, StoreError};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 基于单个 JSON 文件的 [`DocumentStore`]
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取整个键值表（文件不存在时为空表）
    fn read_entries(&self) -> Result<Map<String, Value>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(entries) => Ok(entries),
            _ => Err(StoreError::Backend(format!(
                "{} 不是 JSON 对象",
                self.path.display()
            ))),
        }
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<Document>, StoreError> {
        let mut entries = self.read_entries()?;
        match entries.remove(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, document: &Document) -> Result<(), StoreError> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), serde_json::to_value(document)?);

        // 先写临时文件再改名，避免写到一半时损坏原文件
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&Value::Object(entries))?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
