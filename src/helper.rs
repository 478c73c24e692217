use std::path::Path;

use image::RgbaImage;

use crate::assets::{AssetResolver, AssetSource};
use crate::compose::Compositor;
use crate::config::{LayoutConfig, LogoConfig, DEFAULT_HEADIMG};
use crate::decode;
use crate::error::QrResult;
use crate::fetch::{AssetFetcher, HttpFetcher};
use crate::matrix::{encode, EncodeOptions};
use crate::output::{serialize, OutputFormat};
use crate::raster::rasterize;

/// Side length of a QR code created without an explicit size.
pub const DEFAULT_LENGTH: u32 = 400;

/*---- Generator ----*/

/// Renders QR code images, either plain with an optional centred logo or laid
/// out on a poster template.
///
/// Each call is self-contained: assets are loaded, drawn and released within
/// the call and nothing is cached between calls.
pub struct QrcodeGenerator<F = HttpFetcher> {
    resolver: AssetResolver<F>,
    compositor: Compositor,
    encode_options: EncodeOptions,
    logo_config: LogoConfig,
    format: OutputFormat,
}

impl QrcodeGenerator<HttpFetcher> {
    /// A generator that fetches avatars over HTTP and writes JPEG.
    pub fn new() -> QrResult<Self> {
        Self::with_resolver(AssetResolver::default())
    }
}

impl<F: AssetFetcher> QrcodeGenerator<F> {
    pub fn with_resolver(resolver: AssetResolver<F>) -> QrResult<Self> {
        Ok(Self {
            resolver,
            compositor: Compositor::new()?,
            encode_options: EncodeOptions::default(),
            logo_config: LogoConfig::default(),
            format: OutputFormat::default(),
        })
    }

    pub fn with_compositor(mut self, compositor: Compositor) -> Self {
        self.compositor = compositor;
        self
    }

    pub fn with_encode_options(mut self, options: EncodeOptions) -> Self {
        self.encode_options = options;
        self
    }

    pub fn with_logo_config(mut self, config: LogoConfig) -> Self {
        self.logo_config = config;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn resolver(&self) -> &AssetResolver<F> {
        &self.resolver
    }

    /// Renders a `size` x `size` QR code with `logo`, if any, in the middle.
    #[tracing::instrument(skip(self))]
    pub fn render_qrcode(
        &self,
        content: &str,
        size: u32,
        logo: Option<&AssetSource>,
    ) -> QrResult<RgbaImage> {
        self.logo_config.validate()?;
        let logo = logo.map(|source| self.resolver.resolve(source)).transpose()?;

        let matrix = encode(content, &self.encode_options)?;
        let mut canvas = rasterize(&matrix, size)?;
        tracing::debug!(modules = matrix.width(), size, "rasterized QR code");

        if let Some(logo) = logo {
            self.compositor
                .overlay_logo(&mut canvas, &logo, &self.logo_config)?;
        }
        Ok(canvas)
    }

    /// Creates an encoded QR code image with an optional logo.
    ///
    /// # Arguments
    ///
    /// * `content` - The text to encode.
    /// * `size` - Width and height of the image in pixels.
    /// * `logo` - Optional. An image drawn over the centre at 1/5 of the size.
    ///
    /// # Errors
    ///
    /// Fails on empty or oversized content, a zero size, a logo that cannot be
    /// loaded, or an encoder error. No bytes are returned on failure.
    pub fn create_qrcode(
        &self,
        content: &str,
        size: u32,
        logo: Option<&AssetSource>,
    ) -> QrResult<Vec<u8>> {
        let canvas = self.render_qrcode(content, size, logo)?;
        serialize(&canvas, self.format)
    }

    /// Same as [`Self::create_qrcode`] at [`DEFAULT_LENGTH`].
    pub fn create_qrcode_default(
        &self,
        content: &str,
        logo: Option<&AssetSource>,
    ) -> QrResult<Vec<u8>> {
        self.create_qrcode(content, DEFAULT_LENGTH, logo)
    }

    /// Renders the poster described by `config`.
    ///
    /// The avatar is optional: if it is absent or cannot be loaded (timeout,
    /// error status, non-image body) the bundled placeholder is drawn instead.
    /// Every other failure aborts the render.
    #[tracing::instrument(skip(self, config), fields(qrcode_url = %config.qrcode_url, bg = %config.bg_file))]
    pub fn render_with_background(&self, config: &LayoutConfig) -> QrResult<RgbaImage> {
        let matrix = encode(&config.qrcode_url, &self.encode_options)?;
        let qrcode = rasterize(&matrix, config.qrcode_height)?;

        let bg_source = self.resolver.source_for(&config.bg_file);
        let background = self.resolver.resolve(&bg_source)?;
        tracing::info!(source = ?bg_source, "background");

        let avatar_source = config
            .headimg_source()
            .map(|spec| self.resolver.source_for(spec));
        let avatar = self
            .resolver
            .resolve_or_default(avatar_source.as_ref(), DEFAULT_HEADIMG)?;
        tracing::info!(source = ?avatar_source, fallback = avatar.is_fallback(), "avatar");

        self.compositor
            .compose_background(background.into_rgba8(), &qrcode, avatar.image(), config)
    }

    /// Creates an encoded poster image from `config`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use qrposter::config::LayoutConfig;
    /// use qrposter::helper::QrcodeGenerator;
    ///
    /// let config = LayoutConfig::new("http://blog.csdn.net/qing_gee")
    ///     .with_headimg_url("https://avatars2.githubusercontent.com/u/6011374?v=4")
    ///     .with_realname("沉默王二");
    /// let bytes = QrcodeGenerator::new()?.create_qrcode_with_background(&config)?;
    /// std::fs::write("poster.jpg", bytes)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn create_qrcode_with_background(&self, config: &LayoutConfig) -> QrResult<Vec<u8>> {
        let canvas = self.render_with_background(config)?;
        serialize(&canvas, self.format)
    }
}

/*---- Convenience functions ----*/

/// Generates a QR code image with the default generator.
///
/// # Example
///
/// ```
/// use qrposter::helper::create_qrcode;
///
/// let jpeg = create_qrcode("http://example.com", 400, None).unwrap();
/// assert!(!jpeg.is_empty());
/// ```
pub fn create_qrcode(content: &str, size: u32, logo: Option<&AssetSource>) -> QrResult<Vec<u8>> {
    QrcodeGenerator::new()?.create_qrcode(content, size, logo)
}

/// Generates a QR code image of [`DEFAULT_LENGTH`] pixels.
pub fn create_qrcode_default(content: &str, logo: Option<&AssetSource>) -> QrResult<Vec<u8>> {
    QrcodeGenerator::new()?.create_qrcode_default(content, logo)
}

/// Generates a poster image with the default generator.
pub fn create_qrcode_with_background(config: &LayoutConfig) -> QrResult<Vec<u8>> {
    QrcodeGenerator::new()?.create_qrcode_with_background(config)
}

/// Reads the text of a QR code from an image file.
///
/// # Example
///
/// ```no_run
/// use qrposter::helper::decode_qrcode;
///
/// let text = decode_qrcode("qr_code.jpg").unwrap();
/// println!("{text}");
/// ```
pub fn decode_qrcode(path: impl AsRef<Path>) -> QrResult<String> {
    decode::decode_file(path)
}

/// Reads the text of a QR code from encoded image bytes.
pub fn decode_qrcode_bytes(bytes: &[u8]) -> QrResult<String> {
    decode::decode_bytes(bytes)
}
