use super::*;
use image::{ImageFormat, Rgb, RgbImage};

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 40]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

fn decoded_dims(file: &ImageFile) -> (u32, u32) {
    let img = image::load_from_memory(&file.bytes).unwrap();
    (img.width(), img.height())
}

fn thumbnail_dims(data_uri: &str) -> (u32, u32) {
    let file = ImageFile::from_encoded(data_uri).unwrap();
    assert_eq!(file.mime_type, "image/jpeg");
    decoded_dims(&file)
}

// =============================================================================
// sniffing
// =============================================================================

#[test]
fn sniff_known_formats() {
    assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
    assert_eq!(sniff_mime(&png_bytes(1, 1)), Some("image/png"));
    assert_eq!(sniff_mime(b"GIF89a...."), Some("image/gif"));
    assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
}

#[test]
fn sniff_rejects_other_payloads() {
    assert_eq!(sniff_mime(b"%PDF-1.7"), None);
    assert_eq!(sniff_mime(b"RIFF\0\0\0\0WAVE"), None);
    assert_eq!(sniff_mime(b""), None);
}

// =============================================================================
// decoding
// =============================================================================

#[test]
fn from_encoded_accepts_data_uri_and_bare_base64() {
    let bytes = png_bytes(4, 4);
    let encoded = BASE64.encode(&bytes);

    let from_uri = ImageFile::from_encoded(&format!("data:image/png;base64,{encoded}")).unwrap();
    let bare = ImageFile::from_encoded(&encoded).unwrap();

    assert_eq!(from_uri, bare);
    assert_eq!(bare.mime_type, "image/png");
    assert_eq!(bare.bytes, bytes);
}

#[test]
fn from_encoded_trusts_magic_bytes_over_declared_type() {
    let encoded = BASE64.encode(png_bytes(2, 2));
    let file = ImageFile::from_encoded(&format!("data:image/jpeg;base64,{encoded}")).unwrap();
    assert_eq!(file.mime_type, "image/png");
}

#[test]
fn from_encoded_ignores_embedded_whitespace() {
    let encoded = BASE64.encode(png_bytes(2, 2));
    let (head, tail) = encoded.split_at(10);
    let file = ImageFile::from_encoded(&format!("  {head}\n{tail}\n")).unwrap();
    assert_eq!(file.mime_type, "image/png");
}

#[test]
fn from_encoded_errors() {
    assert_eq!(ImageFile::from_encoded("").unwrap_err(), ImageError::Empty);
    assert_eq!(ImageFile::from_encoded("data:image/png;base64,").unwrap_err(), ImageError::Empty);
    assert_eq!(
        ImageFile::from_encoded("data:image/png,abcd").unwrap_err(),
        ImageError::MalformedDataUri
    );
    assert_eq!(ImageFile::from_encoded("data:image/png;base64").unwrap_err(), ImageError::MalformedDataUri);
    assert_eq!(ImageFile::from_encoded("not base64 !!").unwrap_err(), ImageError::InvalidBase64);
    let text = BASE64.encode(b"hello, this is text");
    assert_eq!(ImageFile::from_encoded(&text).unwrap_err(), ImageError::Unsupported);
}

#[test]
fn from_bytes_rejects_empty() {
    assert_eq!(ImageFile::from_bytes(Vec::new()).unwrap_err(), ImageError::Empty);
}

#[test]
fn data_uri_round_trips() {
    let file = ImageFile::from_bytes(png_bytes(3, 3)).unwrap();
    let uri = file.data_uri();
    assert!(uri.starts_with("data:image/png;base64,"));
    assert_eq!(ImageFile::from_encoded(&uri).unwrap(), file);
    assert!(!file.base64_data().starts_with("data:"));
}

// =============================================================================
// prepare
// =============================================================================

#[test]
fn prepare_keeps_small_images_untouched() {
    let file = ImageFile::from_bytes(png_bytes(100, 60)).unwrap();
    let prepared = prepare(file.clone(), &ImageConfig::default());

    assert!(!prepared.resized);
    assert_eq!(prepared.upload, file);
    assert_eq!(thumbnail_dims(&prepared.thumbnail_data_uri), (100, 60));
}

#[test]
fn prepare_downscales_oversized_images_to_jpeg() {
    let config = ImageConfig { max_edge_px: 200, thumbnail_edge_px: 50 };
    let file = ImageFile::from_bytes(png_bytes(800, 400)).unwrap();
    let prepared = prepare(file, &config);

    assert!(prepared.resized);
    assert_eq!(prepared.upload.mime_type, "image/jpeg");
    assert_eq!(decoded_dims(&prepared.upload), (200, 100));
    assert_eq!(thumbnail_dims(&prepared.thumbnail_data_uri), (50, 25));
}

#[test]
fn prepare_thumbnails_without_resizing_upload() {
    let config = ImageConfig { max_edge_px: 1000, thumbnail_edge_px: 32 };
    let file = ImageFile::from_bytes(png_bytes(64, 128)).unwrap();
    let prepared = prepare(file, &config);

    assert!(!prepared.resized);
    assert_eq!(prepared.upload.mime_type, "image/png");
    assert_eq!(thumbnail_dims(&prepared.thumbnail_data_uri), (16, 32));
}

#[test]
fn prepare_passes_through_undecodable_images() {
    let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x01, 0x02];
    let file = ImageFile::from_bytes(bytes).unwrap();
    let prepared = prepare(file.clone(), &ImageConfig::default());

    assert!(!prepared.resized);
    assert_eq!(prepared.upload, file);
    assert_eq!(prepared.thumbnail_data_uri, file.data_uri());
}
