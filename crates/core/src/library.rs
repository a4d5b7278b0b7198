//! Signature library store
//!
//! Holds the session's reusable signature assets in insertion order. Assets
//! are shared out as `Arc`s; removing one from the library never touches
//! signatures already placed from it, since placement copies the bitmap.

use pdf_signer_capture::{AssetId, SignatureAsset};
use std::sync::Arc;

/// Ordered collection of signature assets
#[derive(Debug, Clone, Default)]
pub struct SignatureLibrary {
    assets: Vec<Arc<SignatureAsset>>,
}

impl SignatureLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an asset and return its id
    pub fn add(&mut self, asset: SignatureAsset) -> AssetId {
        let id = asset.id();
        tracing::info!(
            asset_id = %id,
            source = ?asset.source_type(),
            "signature added to library"
        );
        self.assets.push(Arc::new(asset));
        id
    }

    /// Remove an asset from the library only
    pub fn remove(&mut self, id: AssetId) -> Option<Arc<SignatureAsset>> {
        let index = self.assets.iter().position(|a| a.id() == id)?;
        tracing::info!(asset_id = %id, "signature removed from library");
        Some(self.assets.remove(index))
    }

    pub fn get(&self, id: AssetId) -> Option<Arc<SignatureAsset>> {
        self.assets.iter().find(|a| a.id() == id).cloned()
    }

    /// Assets in insertion order
    pub fn list(&self) -> &[Arc<SignatureAsset>] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
