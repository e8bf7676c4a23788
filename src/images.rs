//! Background card image loading.
//!
//! Each request runs on its own thread: fetch over HTTP or read from disk,
//! decode, crop to a square and scale to the card texture size. The main loop
//! polls finished loads once per tick and uploads them.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use image::imageops::FilterType;
use log::{debug, warn};
use thiserror::Error;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Decoded image data (RGBA8, tightly packed).
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(reqwest::StatusCode),
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("could not read image file: {0}")]
    Io(#[from] std::io::Error),
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Decodes `bytes` and scales the result to `size` × `size`, cropping the
/// longer side so the image fills the square.
pub fn decode_image(bytes: &[u8], size: u32) -> Result<ImageData, ImageError> {
    let img = image::load_from_memory(bytes)?;
    let rgba = img.resize_to_fill(size, size, FilterType::Triangle).to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImageData {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

fn fetch(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>, ImageError> {
    let resp = client.get(url).send()?;
    if !resp.status().is_success() {
        return Err(ImageError::Status(resp.status()));
    }
    Ok(resp.bytes()?.to_vec())
}

fn build_client() -> Result<reqwest::blocking::Client, ImageError> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()?)
}

/// Loads the image at `source`, a URL or a file path, blocking the caller.
pub fn load_image(source: &str, size: u32) -> Result<ImageData, ImageError> {
    let bytes = if is_remote(source) {
        fetch(&build_client()?, source)?
    } else {
        std::fs::read(Path::new(source))?
    };
    decode_image(&bytes, size)
}

/// Manages background image loads, keyed by card index.
pub struct ImageLoader {
    size: u32,
    client: Option<reqwest::blocking::Client>,
    pending: HashMap<usize, mpsc::Receiver<Result<ImageData, ImageError>>>,
    loaded: HashSet<usize>,
    failed: HashSet<usize>,
}

impl ImageLoader {
    /// Images are delivered as `size` × `size`
    pub fn new(size: u32) -> Self {
        Self {
            size,
            client: None,
            pending: HashMap::new(),
            loaded: HashSet::new(),
            failed: HashSet::new(),
        }
    }

    /// Starts loading card `index`'s image. Repeated requests are ignored.
    pub fn request(&mut self, index: usize, source: &str) {
        if self.pending.contains_key(&index)
            || self.loaded.contains(&index)
            || self.failed.contains(&index)
        {
            return;
        }

        let (tx, rx) = mpsc::channel();
        let source = source.to_string();
        let size = self.size;

        if is_remote(&source) {
            let client = match self.shared_client() {
                Ok(client) => client,
                Err(e) => {
                    warn!("Card {} image {}: {}", index, source, e);
                    self.failed.insert(index);
                    return;
                }
            };
            std::thread::spawn(move || {
                let result = fetch(&client, &source).and_then(|bytes| decode_image(&bytes, size));
                let _ = tx.send(result);
            });
        } else {
            std::thread::spawn(move || {
                let _ = tx.send(load_image(&source, size));
            });
        }

        self.pending.insert(index, rx);
    }

    fn shared_client(&mut self) -> Result<reqwest::blocking::Client, ImageError> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = build_client()?;
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Collects finished loads. Call every tick; failures are logged and dropped.
    pub fn poll(&mut self) -> Vec<(usize, ImageData)> {
        let mut completed = Vec::new();
        let mut ready = Vec::new();

        for (&index, rx) in &self.pending {
            match rx.try_recv() {
                Ok(Ok(data)) => {
                    debug!("Card {} image loaded", index);
                    self.loaded.insert(index);
                    ready.push((index, data));
                    completed.push(index);
                }
                Ok(Err(e)) => {
                    warn!("Card {} image failed to load: {}", index, e);
                    self.failed.insert(index);
                    completed.push(index);
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    warn!("Card {} image loader thread died", index);
                    self.failed.insert(index);
                    completed.push(index);
                }
            }
        }
        for index in completed {
            self.pending.remove(&index);
        }

        ready.sort_by_key(|(index, _)| *index);
        ready
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Number of images still being fetched.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Instant;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn wait_until_idle(loader: &mut ImageLoader) -> Vec<(usize, ImageData)> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut ready = Vec::new();
        while !loader.is_idle() && Instant::now() < deadline {
            ready.extend(loader.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        ready
    }

    #[test]
    fn test_decode_scales_to_square() {
        let data = decode_image(&png_bytes(300, 150), 128).unwrap();
        assert_eq!((data.width, data.height), (128, 128));
        assert_eq!(data.rgba.len(), 128 * 128 * 4);
        assert_eq!(&data.rgba[0..4], &[200, 10, 10, 255]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_image(b"definitely not an image", 16),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_image("/nonexistent/morphdeck/card.png", 16);
        assert!(matches!(result, Err(ImageError::Io(_))));
    }

    #[test]
    fn test_loader_reports_failure_and_success() {
        let path = std::env::temp_dir().join(format!("morphdeck-loader-{}.png", std::process::id()));
        std::fs::write(&path, png_bytes(8, 8)).unwrap();

        let mut loader = ImageLoader::new(4);
        loader.request(0, path.to_str().unwrap());
        loader.request(1, "/nonexistent/morphdeck/card.png");
        loader.request(1, "/nonexistent/morphdeck/card.png");
        assert_eq!(loader.pending_count(), 2);

        let ready = wait_until_idle(&mut loader);
        let _ = std::fs::remove_file(&path);

        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].0, 0);
        assert_eq!(ready[0].1.width, 4);
        assert_eq!(loader.loaded_count(), 1);
        assert_eq!(loader.failed_count(), 1);

        // Finished indices are never fetched again
        loader.request(1, "/nonexistent/morphdeck/card.png");
        assert!(loader.is_idle());
    }
}
