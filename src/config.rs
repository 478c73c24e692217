//! Placement parameters for the two composition modes.

use serde::{Deserialize, Serialize};

use crate::error::{QrError, QrResult};

/// Bundled name of the default poster template.
pub const DEFAULT_BG_FILE: &str = "bg.png";

/// Bundled name of the placeholder avatar used when no avatar is given or it cannot be loaded.
pub const DEFAULT_HEADIMG: &str = "default_headimg.png";

/// Layout of a poster: the QR code, the avatar and the display name drawn onto a
/// background template.
///
/// All coordinates are top-left pixel offsets into the background, except
/// `realname_y`, which is the baseline of the name label.
///
/// # Example
///
/// ```
/// use qrposter::config::LayoutConfig;
///
/// let config = LayoutConfig::new("https://example.com")
///     .with_realname("Ada")
///     .with_qrcode_geometry(240, 20, 20);
/// assert_eq!(config.qrcode_height, 240);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub qrcode_height: u32,
    pub qrcode_x: u32,
    pub qrcode_y: u32,

    /// Avatar source: an `http(s)` URL, a bundled resource name or a local path.
    pub headimg_url: Option<String>,
    pub headimg_height: u32,
    pub headimg_x: u32,
    pub headimg_y: u32,

    pub bg_file: String,
    pub qrcode_url: String,
    pub realname: String,
    pub realname_x: u32,
    pub realname_y: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            qrcode_height: 291,
            qrcode_x: 246,
            qrcode_y: 226,
            headimg_url: None,
            headimg_height: 200,
            headimg_x: 37,
            headimg_y: 30,
            bg_file: DEFAULT_BG_FILE.to_string(),
            qrcode_url: String::new(),
            realname: String::new(),
            realname_x: 339,
            realname_y: 140,
        }
    }
}

impl LayoutConfig {
    pub fn new(qrcode_url: impl Into<String>) -> Self {
        Self {
            qrcode_url: qrcode_url.into(),
            ..Self::default()
        }
    }

    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> QrResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_qrcode_geometry(mut self, height: u32, x: u32, y: u32) -> Self {
        self.qrcode_height = height;
        self.qrcode_x = x;
        self.qrcode_y = y;
        self
    }

    pub fn with_headimg_url(mut self, url: impl Into<String>) -> Self {
        self.headimg_url = Some(url.into());
        self
    }

    pub fn with_headimg_geometry(mut self, height: u32, x: u32, y: u32) -> Self {
        self.headimg_height = height;
        self.headimg_x = x;
        self.headimg_y = y;
        self
    }

    pub fn with_bg_file(mut self, bg_file: impl Into<String>) -> Self {
        self.bg_file = bg_file.into();
        self
    }

    pub fn with_realname(mut self, realname: impl Into<String>) -> Self {
        self.realname = realname.into();
        self
    }

    pub fn with_realname_position(mut self, x: u32, y: u32) -> Self {
        self.realname_x = x;
        self.realname_y = y;
        self
    }

    /// The avatar source, treating an empty string the same as no source.
    pub fn headimg_source(&self) -> Option<&str> {
        self.headimg_url.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Sizing of a logo placed in the middle of a QR code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoConfig {
    /// The logo is `1 / logo_part` of the QR image in each dimension.
    pub logo_part: u32,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self { logo_part: 5 }
    }
}

impl LogoConfig {
    pub fn new(logo_part: u32) -> QrResult<Self> {
        let config = Self { logo_part };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> QrResult<()> {
        if self.logo_part == 0 {
            return Err(QrError::encoding("logo_part must be at least 1"));
        }
        Ok(())
    }
}
