// ── Object model loader ──
//
// Resource definitions come from bundled OMA object schemas looked up in
// a read-only asset store under `models/{id}.xml`, falling back to
// `models/{id}-1_0.xml`. Nothing is cached; every call re-reads the asset.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::error::LoadError;
use crate::model::ResourceDefinition;

/// Read-only key/value asset store.
pub trait AssetSource: Send + Sync + 'static {
    /// Contents of `key`, or `Ok(None)` if there is no such asset.
    fn read(&self, key: &str) -> io::Result<Option<String>>;
}

/// Assets stored as files below a root directory.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirAssets {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.root.join(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// In-memory assets, for embedding or tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    entries: HashMap<String, String>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, contents: impl Into<String>) -> Self {
        self.entries.insert(key.into(), contents.into());
        self
    }
}

impl AssetSource for MemoryAssets {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }
}

/// Primary and fallback asset keys for an object id.
pub fn asset_keys(object_id: u16) -> [String; 2] {
    [
        format!("models/{object_id}.xml"),
        format!("models/{object_id}-1_0.xml"),
    ]
}

/// Loads resource definitions for an object type.
#[derive(Clone)]
pub struct ObjectModelLoader {
    assets: Arc<dyn AssetSource>,
}

impl ObjectModelLoader {
    pub fn new(assets: Arc<dyn AssetSource>) -> Self {
        Self { assets }
    }

    /// Loader over `models/` below a directory.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(DirAssets::new(root)))
    }

    pub fn load_resource_definitions(&self, object_id: u16) -> Result<Vec<ResourceDefinition>, LoadError> {
        for key in asset_keys(object_id) {
            let contents = self.assets.read(&key).map_err(|source| LoadError::Io {
                asset: key.clone(),
                source,
            })?;
            if let Some(xml) = contents {
                let defs = parse_object_model(&key, &xml)?;
                debug!(object_id, asset = %key, resources = defs.len(), "object model loaded");
                return Ok(defs);
            }
        }
        Err(LoadError::NotFound { object_id })
    }
}

/// Parse every `<Item ID="n">` of a schema document, in document order.
///
/// A missing or non-numeric `ID` fails the whole document. `Name`,
/// `Operations` and `Type` default to the empty string.
pub fn parse_object_model(asset: &str, xml: &str) -> Result<Vec<ResourceDefinition>, LoadError> {
    let parse_err = |reason: String| LoadError::Parse {
        asset: asset.to_owned(),
        reason,
    };

    let doc = roxmltree::Document::parse(xml).map_err(|e| parse_err(e.to_string()))?;

    doc.descendants()
        .filter(|n| n.has_tag_name("Item"))
        .map(|item| {
            let raw_id = item
                .attribute("ID")
                .ok_or_else(|| parse_err(format!("Item without ID at byte {}", item.range().start)))?;
            let id = raw_id
                .parse::<u16>()
                .map_err(|e| parse_err(format!("invalid Item ID {raw_id:?}: {e}")))?;
            Ok(ResourceDefinition {
                id,
                name: child_text(item, "Name"),
                operations: child_text(item, "Operations"),
                value_type: child_text(item, "Type"),
            })
        })
        .collect()
}

/// Text of the first `tag` child that has text; empty if none.
fn child_text(parent: roxmltree::Node<'_, '_>, tag: &str) -> String {
    parent
        .children()
        .filter(|c| c.has_tag_name(tag))
        .find_map(|c| c.text())
        .unwrap_or_default()
        .to_owned()
}
