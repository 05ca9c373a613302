use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

/// Image formats recognized by [`ImageFormat::sniff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Gif,
    Jpeg,
    Png,
    Bmp,
    Webp,
    Unknown,
}

impl ImageFormat {
    /// Detects the format from the leading bytes of a file.
    pub fn sniff(header: &[u8]) -> Self {
        if header.starts_with(b"GIF87a") || header.starts_with(b"GIF89a") {
            ImageFormat::Gif
        } else if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            ImageFormat::Jpeg
        } else if header.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            ImageFormat::Png
        } else if header.starts_with(b"BM") {
            ImageFormat::Bmp
        } else if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WEBP" {
            ImageFormat::Webp
        } else {
            ImageFormat::Unknown
        }
    }

    /// Whether the API accepts this format as an upload.
    pub fn is_supported_upload(self) -> bool {
        matches!(self, ImageFormat::Gif | ImageFormat::Jpeg | ImageFormat::Png)
    }
}

/// Access to the files named by upload parameters.
pub trait MediaSource {
    fn exists(&self, path: &str) -> bool;

    fn is_readable(&self, path: &str) -> bool;

    fn image_format(&self, path: &str) -> ImageFormat;

    fn read_all(&self, path: &str) -> io::Result<Vec<u8>>;

    /// Returns the content of `path` when it is a readable, non-empty image in a
    /// supported format, `None` otherwise.
    fn load_image(&self, path: &str) -> Option<Vec<u8>> {
        if !self.exists(path) || !self.is_readable(path) {
            log::debug!("{} is not a readable file, sending it as is", path);
            return None;
        }
        let format = self.image_format(path);
        if !format.is_supported_upload() {
            log::debug!("{} has unsupported format {:?}, sending it as is", path, format);
            return None;
        }
        match self.read_all(path) {
            Ok(data) if !data.is_empty() => Some(data),
            Ok(_) => None,
            Err(err) => {
                log::debug!("failed to read {}: {}", path, err);
                None
            }
        }
    }
}

/// Reads media from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMedia;

impl MediaSource for LocalMedia {
    fn exists(&self, path: &str) -> bool {
        fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
    }

    fn is_readable(&self, path: &str) -> bool {
        File::open(Path::new(path)).is_ok()
    }

    fn image_format(&self, path: &str) -> ImageFormat {
        let mut header = Vec::with_capacity(12);
        match File::open(path).and_then(|f| f.take(12).read_to_end(&mut header)) {
            Ok(_) => ImageFormat::sniff(&header),
            Err(_) => ImageFormat::Unknown,
        }
    }

    fn read_all(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::process;

    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    fn scratch_file(name: &str, content: &[u8]) -> String {
        let path = env::temp_dir().join(format!("oauth1-dispatch-{}-{}", process::id(), name));
        fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn sniff_formats() {
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), ImageFormat::Gif);
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::sniff(PNG_HEADER), ImageFormat::Png);
        assert_eq!(ImageFormat::sniff(b"BM\0\0"), ImageFormat::Bmp);
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), ImageFormat::Webp);
        assert_eq!(ImageFormat::sniff(b"hello"), ImageFormat::Unknown);
        assert_eq!(ImageFormat::sniff(b""), ImageFormat::Unknown);
    }

    #[test]
    fn upload_allow_list() {
        assert!(ImageFormat::Png.is_supported_upload());
        assert!(ImageFormat::Gif.is_supported_upload());
        assert!(ImageFormat::Jpeg.is_supported_upload());
        assert!(!ImageFormat::Webp.is_supported_upload());
        assert!(!ImageFormat::Unknown.is_supported_upload());
    }

    #[test]
    fn load_local_png() {
        let path = scratch_file("image.png", PNG_HEADER);
        assert_eq!(LocalMedia.load_image(&path), Some(PNG_HEADER.to_vec()));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn skip_non_images() {
        let path = scratch_file("notes.txt", b"plain text");
        assert_eq!(LocalMedia.load_image(&path), None);
        fs::remove_file(&path).unwrap();

        assert_eq!(LocalMedia.load_image("/definitely/not/here.png"), None);
        assert_eq!(LocalMedia.load_image("just a status text"), None);
    }
}
