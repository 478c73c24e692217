//! Drawing rasters and text onto a canvas.
//!
//! Every draw overwrites the canvas pixels it covers; nothing is alpha blended,
//! so a later draw hides an earlier one wherever they overlap.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use rusttype::{point, Font, GlyphId, PositionedGlyph, Scale};

use crate::bitmap_font::{BitmapFont, BitmapGlyph, ASCENT_ROWS, GLYPH_ROWS};
use crate::config::{LayoutConfig, LogoConfig};
use crate::error::{QrError, QrResult};

pub const LABEL_FONT_TTF: &[u8] = include_bytes!("../assets/fonts/DejaVuSans-Bold.ttf");

pub const LABEL_GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

/// An axis-aligned pixel rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x - self.x < self.width && y - self.y < self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub px: f32,
    pub color: Rgba<u8>,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            px: 28.0,
            color: LABEL_GRAY,
        }
    }
}

/// Where a label character is drawn from.
enum LabelGlyph<'a> {
    Outline(GlyphId),
    Bitmap(&'a BitmapGlyph),
}

pub struct Compositor {
    font: Font<'static>,
    fallback: &'static BitmapFont,
    label: LabelStyle,
}

impl Compositor {
    /// A compositor labelling with the bundled bold font, falling back to the
    /// bundled CJK bitmap glyphs for characters the font lacks.
    pub fn new() -> QrResult<Self> {
        let font = Font::try_from_bytes(LABEL_FONT_TTF)
            .ok_or_else(|| QrError::composition("load label font", "invalid bundled font"))?;
        Ok(Self {
            font,
            fallback: BitmapFont::unifont_cjk(),
            label: LabelStyle::default(),
        })
    }

    pub fn with_font(mut self, ttf: Vec<u8>) -> QrResult<Self> {
        self.font = Font::try_from_vec(ttf)
            .ok_or_else(|| QrError::composition("load label font", "not a TrueType font"))?;
        Ok(self)
    }

    pub fn with_label_style(mut self, label: LabelStyle) -> Self {
        self.label = label;
        self
    }

    /// Draws `logo` in the middle of `canvas`, scaled to `1 / logo_part` of the
    /// canvas in each dimension. Returns where it went, or `None` when the canvas
    /// is too small for the logo to cover a single pixel.
    pub fn overlay_logo(
        &self,
        canvas: &mut RgbaImage,
        logo: &DynamicImage,
        config: &LogoConfig,
    ) -> QrResult<Option<Rect>> {
        config.validate()?;
        let width = canvas.width() / config.logo_part;
        let height = canvas.height() / config.logo_part;
        if width == 0 || height == 0 {
            tracing::debug!(
                canvas = ?canvas.dimensions(),
                logo_part = config.logo_part,
                "canvas too small for a logo"
            );
            return Ok(None);
        }
        let rect = Rect {
            x: (canvas.width() - width) / 2,
            y: (canvas.height() - height) / 2,
            width,
            height,
        };
        draw_image(canvas, &logo.to_rgba8(), rect, FilterType::Triangle);
        Ok(Some(rect))
    }

    /// Lays out a poster on `background`: the QR code, then the avatar, then the
    /// name label, each at the position `config` gives. The background buffer is
    /// reused as the output.
    pub fn compose_background(
        &self,
        background: RgbaImage,
        qrcode: &RgbaImage,
        avatar: &DynamicImage,
        config: &LayoutConfig,
    ) -> QrResult<RgbaImage> {
        let mut canvas = background;

        if config.qrcode_height == 0 {
            return Err(QrError::composition("draw QR code", "zero qrcode_height"));
        }
        let qr_rect = Rect {
            x: config.qrcode_x,
            y: config.qrcode_y,
            width: config.qrcode_height,
            height: config.qrcode_height,
        };
        draw_image(&mut canvas, qrcode, qr_rect, FilterType::Nearest);

        if config.headimg_height == 0 {
            return Err(QrError::composition("draw avatar", "zero headimg_height"));
        }
        let avatar_rect = Rect {
            x: config.headimg_x,
            y: config.headimg_y,
            width: config.headimg_height,
            height: config.headimg_height,
        };
        draw_image(&mut canvas, &avatar.to_rgba8(), avatar_rect, FilterType::Triangle);

        if !config.realname.is_empty() {
            self.draw_label(&mut canvas, &config.realname, config.realname_x, config.realname_y);
        }

        Ok(canvas)
    }

    /// Characters of `text` that neither the label font nor the fallback
    /// glyphs can draw. They come out as the font's missing-glyph box.
    pub fn missing_glyphs(&self, text: &str) -> Vec<char> {
        text.chars()
            .filter(|&c| matches!(self.label_glyph(c), LabelGlyph::Outline(GlyphId(0))))
            .collect()
    }

    fn label_glyph(&self, c: char) -> LabelGlyph<'_> {
        let id = self.font.glyph(c).id();
        match self.fallback.glyph(c) {
            Some(bitmap) if id.0 == 0 => LabelGlyph::Bitmap(bitmap),
            _ => LabelGlyph::Outline(id),
        }
    }

    /// Writes `text` with its baseline at `baseline_y`. Glyph pixels at least
    /// half covered take the label colour; the rest of the canvas is untouched.
    ///
    /// Characters missing from the label font are drawn from the bitmap
    /// fallback, scaled so that its 16 rows span the label size.
    pub fn draw_label(&self, canvas: &mut RgbaImage, text: &str, x: u32, baseline_y: u32) {
        let scale = Scale::uniform(self.label.px);
        let baseline = baseline_y as f32;
        let mut caret = x as f32;
        let mut last: Option<GlyphId> = None;

        for c in text.chars() {
            match self.label_glyph(c) {
                LabelGlyph::Outline(id) => {
                    if let Some(prev) = last {
                        caret += self.font.pair_kerning(scale, prev, id);
                    }
                    let glyph = self.font.glyph(id).scaled(scale);
                    let advance = glyph.h_metrics().advance_width;
                    self.draw_outline(canvas, &glyph.positioned(point(caret, baseline)));
                    caret += advance;
                    last = Some(id);
                }
                LabelGlyph::Bitmap(glyph) => {
                    let cell = self.label.px / GLYPH_ROWS as f32;
                    self.draw_bitmap(canvas, glyph, caret, baseline, cell);
                    caret += glyph.width() as f32 * cell;
                    last = None;
                }
            }
        }
    }

    fn draw_outline(&self, canvas: &mut RgbaImage, glyph: &PositionedGlyph<'_>) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            return;
        };
        glyph.draw(|gx, gy, coverage| {
            if coverage >= 0.5 {
                put_clipped(
                    canvas,
                    gx as i64 + bb.min.x as i64,
                    gy as i64 + bb.min.y as i64,
                    self.label.color,
                );
            }
        });
    }

    /// Nearest-neighbour upscale of `glyph`, one source pixel per `cell`
    /// canvas pixels.
    fn draw_bitmap(
        &self,
        canvas: &mut RgbaImage,
        glyph: &BitmapGlyph,
        left: f32,
        baseline: f32,
        cell: f32,
    ) {
        if cell <= 0.0 {
            return;
        }
        let left = left.round() as i64;
        let top = (baseline - ASCENT_ROWS as f32 * cell).round() as i64;
        let width = (glyph.width() as f32 * cell).round() as u32;
        let height = (GLYPH_ROWS as f32 * cell).round() as u32;
        for dy in 0..height {
            let row = (dy as f32 / cell) as u32;
            for dx in 0..width {
                if glyph.is_set((dx as f32 / cell) as u32, row) {
                    put_clipped(canvas, left + dx as i64, top + dy as i64, self.label.color);
                }
            }
        }
    }
}

fn put_clipped(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    canvas.put_pixel(x as u32, y as u32, color);
}

/// Scales `src` to `rect` and overwrites that part of `canvas`, clipped to its edges.
fn draw_image(canvas: &mut RgbaImage, src: &RgbaImage, rect: Rect, filter: FilterType) {
    if src.dimensions() == (rect.width, rect.height) {
        imageops::replace(canvas, src, rect.x as i64, rect.y as i64);
    } else {
        let scaled = imageops::resize(src, rect.width, rect.height, filter);
        imageops::replace(canvas, &scaled, rect.x as i64, rect.y as i64);
    }
}
