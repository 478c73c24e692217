//! Decoded raster assets: the background template, the logo and the avatar.
//!
//! An asset comes from one of three places: a resource bundled into the crate
//! (optionally overridden by a resource directory), a file on disk, or a remote
//! URL. Remote bytes are written to a temporary file and decoded from disk; the
//! file is removed when it goes out of scope, whether decoding succeeded or not.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};

use crate::error::{QrError, QrResult};
use crate::fetch::{AssetFetcher, HttpFetcher};

pub const BG_PNG: &[u8] = include_bytes!("../assets/bg.png");
pub const DEFAULT_HEADIMG_PNG: &[u8] = include_bytes!("../assets/default_headimg.png");

const BUNDLED: &[(&str, &[u8])] = &[
    (crate::config::DEFAULT_BG_FILE, BG_PNG),
    (crate::config::DEFAULT_HEADIMG, DEFAULT_HEADIMG_PNG),
];

fn bundled(name: &str) -> Option<&'static [u8]> {
    BUNDLED.iter().find(|(n, _)| *n == name).map(|(_, bytes)| *bytes)
}

/// Where an asset is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Resource(String),
    File(PathBuf),
    Url(String),
}

impl AssetSource {
    /// Classifies a user supplied string: `http(s)` URLs are remote, names of
    /// bundled resources are resources, anything else is a file path.
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        if spec.starts_with("http://") || spec.starts_with("https://") {
            Self::Url(spec.to_string())
        } else if bundled(spec).is_some() {
            Self::Resource(spec.to_string())
        } else {
            Self::File(PathBuf::from(spec))
        }
    }
}

impl From<&Path> for AssetSource {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

impl From<PathBuf> for AssetSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

/// Outcome of resolving an optional asset that has a default.
#[derive(Debug)]
pub enum Resolved {
    /// The requested source loaded.
    Asset(DynamicImage),
    /// No source was requested.
    Default(DynamicImage),
    /// The requested source failed and the default was used instead.
    Fallback { image: DynamicImage, cause: QrError },
}

impl Resolved {
    pub fn image(&self) -> &DynamicImage {
        match self {
            Self::Asset(image) | Self::Default(image) | Self::Fallback { image, .. } => image,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

pub struct AssetResolver<F = HttpFetcher> {
    fetcher: F,
    resource_dir: Option<PathBuf>,
    temp_dir: Option<PathBuf>,
}

impl Default for AssetResolver<HttpFetcher> {
    fn default() -> Self {
        Self::new(HttpFetcher::new())
    }
}

impl<F: AssetFetcher> AssetResolver<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            resource_dir: None,
            temp_dir: None,
        }
    }

    /// Looks up resource names in `dir` before the bundled set.
    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = Some(dir.into());
        self
    }

    /// Directory for the transient copies of downloaded assets; the system
    /// temp directory by default.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Like [`AssetSource::parse`], but also recognises names present in the
    /// resource directory.
    pub fn source_for(&self, spec: &str) -> AssetSource {
        let spec = spec.trim();
        match AssetSource::parse(spec) {
            AssetSource::File(_) if self.in_resource_dir(spec) => {
                AssetSource::Resource(spec.to_string())
            }
            other => other,
        }
    }

    fn in_resource_dir(&self, name: &str) -> bool {
        self.resource_dir
            .as_ref()
            .is_some_and(|dir| dir.join(name).is_file())
    }

    pub fn resolve(&self, source: &AssetSource) -> QrResult<DynamicImage> {
        match source {
            AssetSource::Resource(name) => self.load_resource(name),
            AssetSource::File(path) => load_file(path),
            AssetSource::Url(url) => self.load_remote(url),
        }
    }

    /// Resolves `source`, substituting the `default` resource when the source is
    /// absent or fails to load. Only a missing or broken default is an error.
    pub fn resolve_or_default(
        &self,
        source: Option<&AssetSource>,
        default: &str,
    ) -> QrResult<Resolved> {
        let Some(source) = source else {
            return Ok(Resolved::Default(self.load_resource(default)?));
        };
        match self.resolve(source) {
            Ok(image) => Ok(Resolved::Asset(image)),
            Err(cause) => {
                tracing::warn!(?source, %cause, "asset unavailable, using {default}");
                Ok(Resolved::Fallback {
                    image: self.load_resource(default)?,
                    cause,
                })
            }
        }
    }

    pub fn load_resource(&self, name: &str) -> QrResult<DynamicImage> {
        if let Some(dir) = &self.resource_dir {
            let path = dir.join(name);
            if path.is_file() {
                return load_file(&path);
            }
        }
        let bytes = bundled(name)
            .ok_or_else(|| QrError::asset_not_found(format!("resource {name}")))?;
        image::load_from_memory(bytes)
            .map_err(|e| QrError::composition(format!("decode resource {name}"), e))
    }

    fn load_remote(&self, url: &str) -> QrResult<DynamicImage> {
        let fetched = self.fetcher.fetch(url)?;
        fetched.ensure_image(url)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("headimg_").suffix(".img");
        let mut tmp = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        tmp.write_all(&fetched.bytes)?;
        tmp.flush()?;

        decode_path(tmp.path()).map_err(|e| QrError::remote_asset(format!("{url}: {e}")))
    }
}

fn load_file(path: &Path) -> QrResult<DynamicImage> {
    if !path.is_file() {
        return Err(QrError::asset_not_found(path.display().to_string()));
    }
    decode_path(path).map_err(|e| QrError::composition(format!("decode {}", path.display()), e))
}

fn decode_path(path: &Path) -> Result<DynamicImage, image::ImageError> {
    let reader = BufReader::new(File::open(path)?);
    ImageReader::new(reader).with_guessed_format()?.decode()
}
