/// Asset paths and the decoded-image cache.
///
/// ## Layout under the assets directory
///   images/<name>.png                        static screens and overlays
///   emissions_images/<index>.png             activity artwork (160×240)
///   correct_animation/<n>.png                n = 0 is the "versus" marker
///   incorrect_animation/<n>.png
///   gifs/<clip>/frame_<NN>_delay-0.04s.png   losing-screen clips, clip >= 1

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use image::io::Reader as ImageReader;
use image::RgbaImage;

use crate::error::{GameError, Result};

#[derive(Clone, Debug)]
pub struct Assets {
    root: PathBuf,
}

impl Assets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Assets { root: root.into() }
    }

    fn image(&self, name: &str) -> PathBuf {
        self.root.join("images").join(format!("{name}.png"))
    }

    pub fn title(&self) -> PathBuf { self.image("title_screen") }
    pub fn instructions(&self) -> PathBuf { self.image("instructions") }
    pub fn credits(&self) -> PathBuf { self.image("credits") }
    pub fn references(&self) -> PathBuf { self.image("references") }
    pub fn guess_buttons(&self) -> PathBuf { self.image("meaner_greener_buttons") }
    pub fn note_buttons(&self) -> PathBuf { self.image("note_buttons") }

    /// Briefing pages are numbered from 1.
    pub fn briefing(&self, page: u32) -> PathBuf {
        self.image(&format!("before_you_play{page}"))
    }

    pub fn activity(&self, index: usize) -> PathBuf {
        self.root.join("emissions_images").join(format!("{index}.png"))
    }

    pub fn versus(&self) -> PathBuf {
        self.correct_frame(0)
    }

    pub fn correct_frame(&self, frame: u32) -> PathBuf {
        self.root.join("correct_animation").join(format!("{frame}.png"))
    }

    pub fn incorrect_frame(&self, frame: u32) -> PathBuf {
        self.root.join("incorrect_animation").join(format!("{frame}.png"))
    }

    pub fn losing_frame(&self, clip: usize, frame: u32) -> PathBuf {
        self.root
            .join("gifs")
            .join(clip.to_string())
            .join(format!("frame_{frame:02}_delay-0.04s.png"))
    }
}

/// Bounded cache of decoded RGBA images, oldest evicted first.
pub struct ImageCache {
    images: HashMap<PathBuf, RgbaImage>,
    order: VecDeque<PathBuf>,
    capacity: usize,
}

impl ImageCache {
    pub fn new(capacity: usize) -> Self {
        ImageCache {
            images: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&mut self, path: &Path) -> Result<&RgbaImage> {
        if !self.images.contains_key(path) {
            let img = decode(path)?;
            if self.order.len() >= self.capacity {
                if let Some(old) = self.order.pop_front() {
                    self.images.remove(&old);
                }
            }
            self.order.push_back(path.to_path_buf());
            self.images.insert(path.to_path_buf(), img);
        }
        self.images.get(path).ok_or_else(|| GameError::AssetMissing {
            path: path.to_path_buf(),
            reason: "evicted during load".into(),
        })
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.images.len()
    }
}

fn decode(path: &Path) -> Result<RgbaImage> {
    let missing = |reason: String| GameError::AssetMissing { path: path.to_path_buf(), reason };
    let reader = ImageReader::open(path)
        .map_err(|e| missing(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| missing(e.to_string()))?;
    let img = reader.decode().map_err(|e| missing(e.to_string()))?;
    tracing::trace!(path = %path.display(), "decoded image");
    Ok(img.to_rgba8())
}
