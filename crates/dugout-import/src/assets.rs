// Rewrites stored logo/image references into the configured images directory.

use std::path::Path;

use dugout_core::coerce::is_zero_placeholder;
use tracing::debug;

const LEGACY_DIRS: [&str; 2] = ["Saved/Images", "Saved\\Images"];

/// Resolve a logo or image reference against `images_dir`.
///
/// Empty and zero placeholders become `None`. Legacy `Saved/Images/...`
/// references and bare relative names point into `images_dir`. Absolute
/// paths and paths already under `data/` are kept.
pub fn migrate_asset_path(raw: &str, images_dir: &Path) -> Option<String> {
    let raw = raw.trim();
    if is_zero_placeholder(raw) {
        return None;
    }

    let file_name = || {
        raw.rsplit(['/', '\\'])
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(raw)
    };

    if LEGACY_DIRS.iter().any(|dir| raw.contains(dir)) {
        let migrated = images_dir.join(file_name()).to_string_lossy().into_owned();
        debug!("migrating asset path {raw} -> {migrated}");
        return Some(migrated);
    }

    if Path::new(raw).is_absolute() || raw.starts_with('/') || raw.starts_with("data/") {
        return Some(raw.to_string());
    }

    Some(images_dir.join(file_name()).to_string_lossy().into_owned())
}
