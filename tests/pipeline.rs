use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, Rgba, RgbaImage};

use qrposter::assets::{AssetResolver, AssetSource, BG_PNG, DEFAULT_HEADIMG_PNG};
use qrposter::compose::LABEL_GRAY;
use qrposter::config::LayoutConfig;
use qrposter::fetch::{AssetFetcher, FetchedAsset};
use qrposter::helper::{create_qrcode, decode_qrcode, decode_qrcode_bytes, QrcodeGenerator};
use qrposter::output::OutputFormat;
use qrposter::{QrError, QrResult};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Serves one canned response and counts requests.
struct CannedFetcher {
    bytes: Vec<u8>,
    content_type: Option<&'static str>,
    fail: bool,
    calls: AtomicUsize,
}

impl CannedFetcher {
    fn image(img: &RgbaImage) -> Self {
        Self {
            bytes: png(img),
            content_type: Some("image/png"),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn json_error() -> Self {
        Self {
            bytes: br#"{"errcode":40001,"errmsg":"invalid credential"}"#.to_vec(),
            content_type: Some("application/json; encoding=utf-8"),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn timeout() -> Self {
        Self {
            bytes: Vec::new(),
            content_type: None,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

impl AssetFetcher for CannedFetcher {
    fn fetch(&self, url: &str) -> QrResult<FetchedAsset> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(QrError::remote_asset(format!("{url}: timed out")));
        }
        Ok(FetchedAsset::new(
            self.bytes.clone(),
            self.content_type.map(str::to_string),
        ))
    }
}

fn png(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn generator(fetcher: CannedFetcher) -> QrcodeGenerator<CannedFetcher> {
    QrcodeGenerator::with_resolver(AssetResolver::new(fetcher))
        .unwrap()
        .with_output_format(OutputFormat::Png)
}

fn region_matches(canvas: &RgbaImage, expected: &RgbaImage, x0: u32, y0: u32) -> bool {
    expected
        .enumerate_pixels()
        .all(|(x, y, p)| canvas.get_pixel(x0 + x, y0 + y) == p)
}

fn default_avatar() -> RgbaImage {
    image::load_from_memory(DEFAULT_HEADIMG_PNG).unwrap().to_rgba8()
}

#[test]
fn plain_qrcode_round_trips_through_jpeg() {
    init_tracing();
    let bytes = create_qrcode("http://example.com", 400, None).unwrap();
    assert!(!bytes.is_empty());
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
    assert_eq!(decode_qrcode_bytes(&bytes).unwrap(), "http://example.com");
}

#[test]
fn qrcode_file_decodes() {
    let bytes = create_qrcode("Hello, World!", 250, None).unwrap();
    let file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
    std::fs::write(file.path(), bytes).unwrap();
    assert_eq!(decode_qrcode(file.path()).unwrap(), "Hello, World!");
}

#[test]
fn unset_avatar_uses_bundled_default() {
    init_tracing();
    let renderer = generator(CannedFetcher::timeout());
    let config = LayoutConfig::new("http://example.com");
    let canvas = renderer.render_with_background(&config).unwrap();

    assert_eq!(canvas.dimensions(), (600, 560));
    assert!(region_matches(&canvas, &default_avatar(), config.headimg_x, config.headimg_y));
    assert_eq!(renderer.resolver().fetcher().calls.load(Ordering::SeqCst), 0);
}

#[test]
fn failed_avatar_fetch_falls_back_to_default() {
    for fetcher in [CannedFetcher::timeout(), CannedFetcher::json_error()] {
        let renderer = generator(fetcher);
        let config = LayoutConfig::new("http://example.com")
            .with_headimg_url("https://avatars.example.com/u/1.png");
        let canvas = renderer.render_with_background(&config).unwrap();

        assert!(region_matches(&canvas, &default_avatar(), config.headimg_x, config.headimg_y));
        // A single attempt, no retries.
        assert_eq!(renderer.resolver().fetcher().calls.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn fetched_avatar_is_drawn() {
    let blue = Rgba([0, 0, 255, 255]);
    let renderer = generator(CannedFetcher::image(&RgbaImage::from_pixel(200, 200, blue)));
    let config = LayoutConfig::new("http://example.com")
        .with_headimg_url("https://avatars.example.com/u/1.png");
    let canvas = renderer.render_with_background(&config).unwrap();

    let expected = RgbaImage::from_pixel(200, 200, blue);
    assert!(region_matches(&canvas, &expected, config.headimg_x, config.headimg_y));
}

#[test]
fn empty_name_leaves_label_area_as_background() {
    let renderer = generator(CannedFetcher::timeout());
    let bg = image::load_from_memory(BG_PNG).unwrap().to_rgba8();

    let config = LayoutConfig::new("http://example.com");
    let canvas = renderer.render_with_background(&config).unwrap();
    let label_area = (config.realname_x..config.realname_x + 200)
        .flat_map(|x| (config.realname_y - 30..config.realname_y + 8).map(move |y| (x, y)));
    for (x, y) in label_area.clone() {
        assert_eq!(canvas.get_pixel(x, y), bg.get_pixel(x, y), "pixel ({x}, {y})");
    }

    let named = renderer
        .render_with_background(&config.clone().with_realname("Ada Lovelace"))
        .unwrap();
    assert!(label_area.into_iter().any(|(x, y)| named.get_pixel(x, y) != bg.get_pixel(x, y)));
}

#[test]
fn chinese_name_is_drawn_in_gray() {
    let renderer = generator(CannedFetcher::timeout());
    let config = LayoutConfig::new("http://blog.csdn.net/qing_gee");
    let blank = renderer.render_with_background(&config).unwrap();
    let named = renderer
        .render_with_background(&config.clone().with_realname("沉默王二"))
        .unwrap();

    let changed: Vec<_> = named
        .enumerate_pixels()
        .filter(|(x, y, p)| blank.get_pixel(*x, *y) != *p)
        .collect();
    assert!(changed.len() > 200);
    for (x, y, p) in changed {
        assert_eq!(*p, LABEL_GRAY);
        // Four 28 px cells to the right of realname_x, around the baseline.
        assert!((config.realname_x..config.realname_x + 4 * 28).contains(&x), "x = {x}");
        assert!((config.realname_y - 28..config.realname_y + 8).contains(&y), "y = {y}");
    }
}

#[test]
fn later_draws_occlude_earlier_ones() {
    let red = Rgba([255, 0, 0, 255]);
    let renderer = generator(CannedFetcher::image(&RgbaImage::from_pixel(10, 10, red)));
    // Avatar square [100, 200) sits inside the QR square [50, 350).
    let config = LayoutConfig::new("http://example.com")
        .with_qrcode_geometry(300, 50, 50)
        .with_headimg_url("http://avatars.example.com/red.png")
        .with_headimg_geometry(100, 100, 100);
    let canvas = renderer.render_with_background(&config).unwrap();

    for (x, y) in [(100, 100), (150, 150), (199, 199)] {
        assert_eq!(*canvas.get_pixel(x, y), red);
    }
    let qr_pixel = *canvas.get_pixel(50, 50);
    assert!(qr_pixel == Rgba([255, 255, 255, 255]) || qr_pixel == Rgba([0, 0, 0, 255]));
}

#[test]
fn poster_qrcode_is_readable() {
    let renderer = generator(CannedFetcher::timeout());
    let config = LayoutConfig::new("http://blog.csdn.net/qing_gee").with_realname("Ada");
    let bytes = renderer.create_qrcode_with_background(&config).unwrap();
    assert_eq!(decode_qrcode_bytes(&bytes).unwrap(), "http://blog.csdn.net/qing_gee");
}

#[test]
fn json_config_drives_the_layout() {
    let config = LayoutConfig::from_json_str(
        r#"{
            "qrcode_url": "http://example.com",
            "qrcode_height": 150,
            "qrcode_x": 400,
            "qrcode_y": 380,
            "headimg_height": 100,
            "headimg_x": 10,
            "headimg_y": 10
        }"#,
    )
    .unwrap();
    let renderer = generator(CannedFetcher::timeout());
    let canvas = renderer.render_with_background(&config).unwrap();

    let avatar = image::imageops::resize(
        &default_avatar(),
        100,
        100,
        image::imageops::FilterType::Triangle,
    );
    assert!(region_matches(&canvas, &avatar, 10, 10));
}

#[test]
fn missing_background_returns_an_error_not_an_empty_image() {
    let renderer = generator(CannedFetcher::timeout());
    let config = LayoutConfig::new("http://example.com").with_bg_file("no_such_template.png");
    assert!(matches!(
        renderer.create_qrcode_with_background(&config),
        Err(QrError::AssetNotFound(_))
    ));
}

#[test]
fn missing_content_returns_an_encoding_error() {
    let renderer = generator(CannedFetcher::timeout());
    let config = LayoutConfig::default();
    assert!(matches!(
        renderer.create_qrcode_with_background(&config),
        Err(QrError::Encoding(_))
    ));
}

#[test]
fn logo_source_from_string() {
    let file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    std::fs::write(
        file.path(),
        png(&RgbaImage::from_pixel(8, 8, Rgba([0, 128, 0, 255]))),
    )
    .unwrap();
    let source = AssetSource::parse(file.path().to_str().unwrap());
    let bytes = create_qrcode("http://example.com", 300, Some(&source)).unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
    let centre = img.get_pixel(150, 150);
    assert!(centre[1] > 100 && centre[0] < 60 && centre[2] < 60);
}
