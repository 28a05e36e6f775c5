//! TOML layout catalog for snapshot images
//!
//! Describes what the raw dump contains: where it maps, the target's
//! pointer layout, the struct layouts, and the named symbols commands can
//! reference.

use super::SymbolBinding;
use crate::core::types::{ByteOrder, ProbeError, ProbeResult, TypeDescriptor};
use crate::provider::TargetLayout;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct ImageSection {
    /// Base address the dump file maps at.
    pub base: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetSection {
    #[serde(default = "default_pointer_size")]
    pub pointer_size: usize,
    #[serde(default = "default_byte_order")]
    pub byte_order: String,
}

fn default_pointer_size() -> usize {
    8
}

fn default_byte_order() -> String {
    "little".to_string()
}

impl Default for TargetSection {
    fn default() -> Self {
        TargetSection {
            pointer_size: default_pointer_size(),
            byte_order: default_byte_order(),
        }
    }
}

/// The parsed catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutCatalog {
    pub image: ImageSection,
    #[serde(default)]
    pub target: TargetSection,
    #[serde(default)]
    pub types: Vec<TypeDescriptor>,
    #[serde(default)]
    pub symbols: Vec<SymbolBinding>,
}

impl LayoutCatalog {
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> ProbeResult<Self> {
        toml::from_str(contents)
            .map_err(|e| ProbeError::InvalidArgument(format!("layout catalog: {e}")))
    }

    pub fn target_layout(&self) -> ProbeResult<TargetLayout> {
        let byte_order = ByteOrder::from_str(&self.target.byte_order)
            .map_err(ProbeError::InvalidArgument)?;
        Ok(TargetLayout {
            pointer_size: self.target.pointer_size,
            byte_order,
        })
    }
}
