use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;

use crate::{
    assets::decode::decode_frame,
    composition::model::FrameSequence,
    foundation::error::{CineError, CineResult},
};

/// One decoded still of a frame sequence.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameImage {
    pub width: u32,
    pub height: u32,
    /// Straight (non-premultiplied) RGBA8, row-major, tightly packed.
    pub rgba8: Arc<Vec<u8>>,
}

impl std::fmt::Debug for FrameImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba8.len())
            .finish()
    }
}

impl FrameImage {
    /// Single-colour frame, mostly useful for hosts that synthesize placeholders.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let px = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(px * 4);
        for _ in 0..px {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            rgba8: Arc::new(data),
        }
    }
}

/// Resolve a site-rooted asset URL (`/frames/a/frame_0001.webp`) into a relative path.
pub fn normalize_site_path(source: &str) -> CineResult<String> {
    let s = source.replace('\\', "/");
    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CineError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CineError::validation(
            "asset path must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

/// Loads frame sequences from a directory standing in for the site root.
#[derive(Clone, Debug)]
pub struct FsFrameLoader {
    root: PathBuf,
}

impl FsFrameLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load(&self, source: &str) -> CineResult<FrameImage> {
        let rel = normalize_site_path(source)?;
        let path = self.root.join(Path::new(&rel));
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read frame bytes from '{}'", path.display()))?;
        decode_frame(&bytes)
            .map_err(|e| CineError::asset(format!("frame '{}': {e}", path.display())))
    }

    /// Load every slot of `seq` in order, reporting each outcome to `on_resolved`.
    ///
    /// A failing slot does not stop the remaining ones.
    pub fn load_each(
        &self,
        seq: &FrameSequence,
        mut on_resolved: impl FnMut(usize, CineResult<FrameImage>),
    ) {
        for (slot, source) in seq.frame_sources().iter().enumerate() {
            on_resolved(slot, self.load(source));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/frames.rs"]
mod tests;
