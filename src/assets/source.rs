//! The host collaborator that supplies raw model bytes.
//!
//! The viewer never touches the filesystem or the network itself; it asks a
//! [`ModelReader`] for an asset by name and awaits the bytes. Hosts embed the
//! viewer by handing it whatever reader matches their platform. The
//! [`fs_reader`] below is the default for desktop shells.

use std::path::PathBuf;
use std::pin::Pin;

use anyhow::Context as _;

/// Boxed future returned by a [`ModelReader`] call.
pub type ReadFuture = Pin<Box<dyn Future<Output = anyhow::Result<Vec<u8>>> + Send>>;

/// Fetches raw model bytes by asset name. Every failure mode, including a
/// timeout imposed by the caller, surfaces as a fetch error in the viewer
/// status; the reader itself just returns `Err`.
pub type ModelReader = Box<dyn Fn(&str) -> ReadFuture + Send + Sync>;

/// Reader that resolves `<root>/<asset>` on the local filesystem.
pub fn fs_reader(root: impl Into<PathBuf>) -> ModelReader {
    let root = root.into();
    Box::new(move |asset: &str| {
        let path = root.join(asset);
        Box::pin(async move {
            let bytes = tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading model file {}", path.display()))?;
            Ok(bytes)
        })
    })
}

/// Reader that serves one in-memory payload regardless of the asset name.
/// Handy for embedding a fallback model or for tests.
pub fn static_reader(bytes: Vec<u8>) -> ModelReader {
    Box::new(move |_asset: &str| {
        let bytes = bytes.clone();
        Box::pin(async move { Ok(bytes) })
    })
}
