//! Saving and loading documents.
//!
//! A saved document is its full change history: `RDOC` magic, one
//! format-version byte, then the `postcard` encoding of the authoring actor and
//! every change in log order. Loading replays that history through the normal
//! apply path, so a loaded document is indistinguishable from one that
//! received the same changes over the wire.

use std::{collections::HashSet, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Document, PersistenceError};
use crate::{
    Result,
    change::{ActorId, Change},
    constants::{DOCUMENT_MAGIC, FORMAT_VERSION},
    log::traversal::topological_order,
};

/// Borrowed view written by [`Document::save`].
#[derive(Serialize)]
struct SavedDocumentRef<'a> {
    actor: &'a ActorId,
    changes: Vec<&'a Change>,
}

/// Owned form read back by [`Document::load`].
#[derive(Deserialize)]
struct SavedDocument {
    actor: ActorId,
    changes: Vec<Change>,
}

impl Document {
    /// Encodes the full history of the document.
    pub fn save(&self) -> Result<Vec<u8>> {
        let saved = SavedDocumentRef {
            actor: &self.actor,
            changes: self.log.iter().collect(),
        };
        let mut out = Vec::new();
        out.extend_from_slice(DOCUMENT_MAGIC);
        out.push(FORMAT_VERSION);
        postcard::to_io(&saved, &mut out).map_err(|e| PersistenceError::EncodeError {
            reason: e.to_string(),
        })?;
        debug!(
            actor = %self.actor,
            changes = saved.changes.len(),
            bytes = out.len(),
            "Saved document"
        );
        Ok(out)
    }

    /// Restores a document from [`save`](Self::save) output under a fresh
    /// actor.
    ///
    /// # Errors
    /// [`PersistenceError::DecodeError`] if the bytes are truncated or corrupt,
    /// a change hash does not verify, a change appears twice, or the
    /// dependency graph has a cycle or a dangling dependency.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        Self::load_with_actor(bytes, ActorId::random())
    }

    /// Restores a document that continues authoring as `actor`.
    pub fn load_with_actor(bytes: &[u8], actor: ActorId) -> Result<Self> {
        let saved = decode_saved(bytes)?;
        Self::replay(saved.changes, actor)
    }

    /// Restores a document under the actor that saved it.
    ///
    /// Only safe when the saving instance will not author again, e.g. when a
    /// process reloads its own state after a restart.
    pub fn load_resume(bytes: &[u8]) -> Result<Self> {
        let saved = decode_saved(bytes)?;
        Self::replay(saved.changes, saved.actor)
    }

    /// The actor recorded in saved bytes, without replaying the history.
    pub fn saved_actor(bytes: &[u8]) -> Result<ActorId> {
        Ok(decode_saved(bytes)?.actor)
    }

    fn replay(changes: Vec<Change>, actor: ActorId) -> Result<Self> {
        for change in &changes {
            change
                .verify()
                .map_err(|e| PersistenceError::decode(e.to_string()))?;
        }
        let ordered = topological_order(changes, &HashSet::new())
            .map_err(|e| PersistenceError::decode(e.to_string()))?;

        let mut doc = Document::with_actor(actor);
        for change in ordered {
            doc.apply_change(change)
                .map_err(|e| PersistenceError::decode(e.to_string()))?;
        }
        debug!(actor = %actor, changes = doc.log.len(), "Loaded document");
        Ok(doc)
    }

    /// Saves the document to a file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.save()?)?;
        Ok(())
    }

    /// Loads a document from a file under a fresh actor.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::load(&bytes)
    }
}

fn decode_saved(bytes: &[u8]) -> Result<SavedDocument> {
    let header_len = DOCUMENT_MAGIC.len() + 1;
    if bytes.len() < header_len {
        return Err(PersistenceError::decode(format!(
            "{} bytes is shorter than the document header",
            bytes.len()
        ))
        .into());
    }
    if &bytes[..DOCUMENT_MAGIC.len()] != DOCUMENT_MAGIC {
        return Err(PersistenceError::decode("missing document magic").into());
    }
    let version = bytes[DOCUMENT_MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(PersistenceError::decode(format!(
            "unsupported document format version {version}; only version {FORMAT_VERSION} is supported"
        ))
        .into());
    }

    let (saved, rest): (SavedDocument, &[u8]) = postcard::take_from_bytes(&bytes[header_len..])
        .map_err(|e| PersistenceError::decode(format!("undecodable body: {e}")))?;
    if !rest.is_empty() {
        return Err(PersistenceError::decode(format!(
            "{} trailing bytes after document body",
            rest.len()
        ))
        .into());
    }
    Ok(saved)
}
