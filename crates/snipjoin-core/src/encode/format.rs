//! Output format selection.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Formats an image can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless, keeps alpha. Used whenever the extension is not recognized.
    #[default]
    Png,
    /// Lossy, alpha is dropped.
    Jpeg,
    /// Uncompressed bitmap with alpha.
    Bmp,
    /// Palette based, colors are quantized to 256.
    Gif,
}

impl OutputFormat {
    /// Map a file extension (without the dot, any case) to a format.
    ///
    /// Unknown extensions fall back to PNG.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => OutputFormat::Jpeg,
            "bmp" => OutputFormat::Bmp,
            "gif" => OutputFormat::Gif,
            _ => OutputFormat::Png,
        }
    }

    /// Pick the format for a destination path from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Gif => "gif",
        }
    }

    /// MIME type, for hosts that hand the bytes to a browser or clipboard.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Bmp => "image/bmp",
            OutputFormat::Gif => "image/gif",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(OutputFormat::from_extension("png"), OutputFormat::Png);
        assert_eq!(OutputFormat::from_extension("JPG"), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_extension("jpeg"), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_extension("Bmp"), OutputFormat::Bmp);
        assert_eq!(OutputFormat::from_extension("gif"), OutputFormat::Gif);
        assert_eq!(OutputFormat::from_extension("webp"), OutputFormat::Png);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(OutputFormat::from_path("out/cut.jpeg"), OutputFormat::Jpeg);
        assert_eq!(OutputFormat::from_path("cut.GIF"), OutputFormat::Gif);
        // Missing extension defaults to PNG
        assert_eq!(OutputFormat::from_path("cut"), OutputFormat::Png);
        assert_eq!(OutputFormat::from_path("archive.tar.bmp"), OutputFormat::Bmp);
    }

    #[test]
    fn test_extension_maps_back() {
        for format in [
            OutputFormat::Png,
            OutputFormat::Jpeg,
            OutputFormat::Bmp,
            OutputFormat::Gif,
        ] {
            assert_eq!(OutputFormat::from_extension(format.extension()), format);
        }
    }
}
