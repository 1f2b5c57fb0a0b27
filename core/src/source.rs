//! file: core/src/source.rs
//! description: CFG documents on disk.
//!
//! A document is the JSON serialization of a top-level `Cfg`.

use std::path::PathBuf;

use crate::cfg::Cfg;
use crate::error::{EmitErrorExt, Level};
use crate::lower::{LowerOptions, lower_with};

#[derive(Debug, Clone)]
pub struct CfgSource {
    pub name: String,
    pub path: PathBuf,
    pub cfg: Cfg,
}

impl CfgSource {
    pub fn load(path: PathBuf) -> Result<Self, Box<dyn EmitErrorExt>> {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let content = std::fs::read_to_string(&path)
            .map_err(|_| Box::new(MissingSourceError { path: path.clone() }) as Box<dyn EmitErrorExt>)?;
        let mut source = Self::from_json(name, &content)?;
        source.path = path;
        Ok(source)
    }

    pub fn from_json(name: impl Into<String>, content: &str) -> Result<Self, Box<dyn EmitErrorExt>> {
        let name = name.into();
        let cfg: Cfg = serde_json::from_str(content).map_err(|e| {
            Box::new(MalformedSourceError {
                name: name.clone(),
                line: e.line(),
                column: e.column(),
                reason: e.to_string(),
            }) as Box<dyn EmitErrorExt>
        })?;
        Ok(CfgSource { name, path: PathBuf::new(), cfg })
    }

    pub fn lower(&self, options: &LowerOptions) -> Result<Vec<u8>, Box<dyn EmitErrorExt>> {
        Ok(lower_with(&self.cfg, options)?)
    }

    pub fn block_count(&self) -> usize {
        self.cfg.blocks.len()
    }
}

impl std::fmt::Display for CfgSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CFG: {} at {:?}", self.name, self.path)
    }
}

#[derive(Debug, Clone)]
pub struct MissingSourceError {
    pub path: PathBuf,
}

impl std::fmt::Display for MissingSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Missing CFG document at {:?}", self.path)
    }
}

impl std::error::Error for MissingSourceError {}

impl EmitErrorExt for MissingSourceError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "avm1emit.source".to_string()
    }

    fn offset(&self) -> Option<usize> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct MalformedSourceError {
    pub name: String,
    pub line: usize,
    pub column: usize,
    pub reason: String,
}

impl std::fmt::Display for MalformedSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}: {}", self.name, self.line, self.column, self.reason)
    }
}

impl std::error::Error for MalformedSourceError {}

impl EmitErrorExt for MalformedSourceError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "avm1emit.source".to_string()
    }

    fn offset(&self) -> Option<usize> {
        None
    }
}
