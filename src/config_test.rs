use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_when_unset() {
    let cfg = AppConfig::from_lookup(lookup_from(&[]));
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    assert_eq!(cfg.web_dir, PathBuf::from(DEFAULT_WEB_DIR));
    assert_eq!(cfg.image, ImageConfig::default());
}

#[test]
fn reads_overrides() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("PORT", "8080"),
        ("DATA_DIR", "/var/lib/sellitfast"),
        ("WEB_DIR", "dist"),
        ("IMAGE_MAX_EDGE_PX", "1024"),
        ("THUMBNAIL_EDGE_PX", "128"),
    ]));
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.data_dir, PathBuf::from("/var/lib/sellitfast"));
    assert_eq!(cfg.web_dir, PathBuf::from("dist"));
    assert_eq!(cfg.image, ImageConfig { max_edge_px: 1024, thumbnail_edge_px: 128 });
}

#[test]
fn invalid_values_fall_back() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("PORT", "eighty"),
        ("DATA_DIR", "  "),
        ("IMAGE_MAX_EDGE_PX", "-5"),
        ("THUMBNAIL_EDGE_PX", "0"),
    ]));
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
    assert_eq!(cfg.image.max_edge_px, DEFAULT_MAX_EDGE_PX);
    assert_eq!(cfg.image.thumbnail_edge_px, 1);
}
