use std::fs;
use std::path::Path;

use ab_glyph::FontArc;

/// Fonts tried, in order, when no label font is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Loads the font used for overlay labels.
///
/// A configured path wins; otherwise the first readable system font is
/// used. `None` means labels are painted as bare plates.
pub fn load_label_font(configured: Option<&Path>) -> Option<FontArc> {
    if let Some(path) = configured {
        match read_font(path) {
            Some(font) => return Some(font),
            None => log::warn!("Label font {} could not be loaded", path.display()),
        }
    }
    let font = SYSTEM_FONTS
        .iter()
        .map(Path::new)
        .filter(|p| p.is_file())
        .find_map(read_font);
    if font.is_none() {
        log::warn!("No label font found; overlay labels will have no text");
    }
    font
}

fn read_font(path: &Path) -> Option<FontArc> {
    let bytes = fs::read(path).ok()?;
    match FontArc::try_from_vec(bytes) {
        Ok(font) => {
            log::debug!("Label font: {}", path.display());
            Some(font)
        }
        Err(e) => {
            log::warn!("{} is not a usable font: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_font_file_is_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), b"not a font").unwrap();
        assert!(read_font(file.path()).is_none());
    }

    #[test]
    fn test_missing_configured_font_falls_back_to_system() {
        let fallback = load_label_font(None).is_some();
        let loaded = load_label_font(Some(Path::new("/nonexistent/font.ttf")));
        assert_eq!(loaded.is_some(), fallback);
    }
}
