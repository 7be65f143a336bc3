//! EXIF embedding for annotated images.
//!
//! The write is a read-merge-write over the full tag container: the
//! existing EXIF is loaded with `little_exif`, the three target fields are
//! set, and the merged container is swapped back into the JPEG with
//! `img-parts` so every other segment survives byte-for-byte.

use std::fs;
use std::panic;
use std::path::Path;

use img_parts::jpeg::{Jpeg, JpegSegment};
use img_parts::{Bytes, ImageEXIF};
use little_exif::endian::Endian;
use little_exif::exif_tag::ExifTag;
use little_exif::exif_tag_format::ExifTagFormat;
use little_exif::filetype::FileExtension;
use little_exif::ifd::ExifTagGroup;
use little_exif::metadata::Metadata;
use tracing::debug;

use crate::api::ImageMetadata;
use crate::error::ExifError;

/// Windows Explorer title tag (XPTitle), UTF-16LE.
const TAG_XP_TITLE: u16 = 0x9C9B;

/// Windows Explorer keywords tag (XPKeywords), UTF-16LE.
const TAG_XP_KEYWORDS: u16 = 0x9C9E;

/// little_exif's as_u8_vec(JPEG) output starts with the APP1 marker (2B)
/// and segment length (2B); the "Exif\0\0" identifier and TIFF data after
/// that form the segment body img-parts works with.
const APP1_MARKER_AND_LEN: usize = 4;

/// Segment index img-parts uses for the EXIF segment in fully-formed
/// files. Files with fewer leading segments get it earlier, still ahead
/// of the image data.
const EXIF_SEGMENT_INDEX: usize = 3;

/// APP1 marker byte, the segment type carrying EXIF.
const MARKER_APP1: u8 = 0xE1;

/// SOS marker byte; the entropy-coded image data starts here.
const MARKER_SOS: u8 = 0xDA;

pub struct ExifWriter;

impl Default for ExifWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExifWriter {
    pub fn new() -> Self {
        Self
    }

    /// Embeds title, description and keywords into the image's EXIF
    /// container in place.
    ///
    /// Title and the `", "`-joined keyword string go to the XP* tags as
    /// UTF-16LE; the description goes to ImageDescription as 8-bit text.
    /// All three land in the primary-image section (IFD0). Any error
    /// leaves the file unmodified: the image is only rewritten after the
    /// merged container has serialized cleanly.
    pub fn embed(&self, path: &Path, metadata: &ImageMetadata) -> Result<(), ExifError> {
        let file_bytes = fs::read(path).map_err(|e| ExifError::ReadImage {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut jpeg =
            Jpeg::from_bytes(Bytes::from(file_bytes)).map_err(|e| ExifError::ParseJpeg {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        if jpeg.exif().is_none() {
            return Err(ExifError::MissingContainer {
                path: path.to_path_buf(),
            });
        }

        // little_exif can panic on some malformed TIFF payloads, so the
        // parse is contained and surfaces as a per-image failure. The
        // panic hook is swapped out so the transcript stays clean.
        let path_owned = path.to_path_buf();
        let prev_hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let parsed = panic::catch_unwind(move || Metadata::new_from_path(&path_owned));
        panic::set_hook(prev_hook);

        let mut container = match parsed {
            Ok(Ok(container)) => container,
            Ok(Err(e)) => {
                return Err(ExifError::LoadContainer {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ExifError::LoadContainer {
                    path: path.to_path_buf(),
                    reason: "parser panicked on malformed container".to_string(),
                })
            }
        };

        container.set_tag(ExifTag::ImageDescription(metadata.description.clone()));
        container.set_tag(xp_text_tag(TAG_XP_TITLE, &metadata.title)?);
        let keywords = metadata.keywords.join(", ");
        container.set_tag(xp_text_tag(TAG_XP_KEYWORDS, &keywords)?);

        let app1 = container
            .as_u8_vec(FileExtension::JPEG)
            .map_err(|e| ExifError::SerializeContainer {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        if app1.len() <= APP1_MARKER_AND_LEN {
            return Err(ExifError::SerializeContainer {
                path: path.to_path_buf(),
                reason: "container serialized to nothing".to_string(),
            });
        }

        // Replace the EXIF segment by hand: set_exif(None) removes the
        // old one wherever it sits, and the insert index is clamped so a
        // file with few segments keeps the new one ahead of its SOS.
        jpeg.set_exif(None);
        let segment = JpegSegment::new_with_contents(
            MARKER_APP1,
            Bytes::from(app1[APP1_MARKER_AND_LEN..].to_vec()),
        );
        let index = jpeg
            .segments()
            .iter()
            .position(|s| s.marker() == MARKER_SOS)
            .unwrap_or_else(|| jpeg.segments().len())
            .min(EXIF_SEGMENT_INDEX);
        jpeg.segments_mut().insert(index, segment);

        fs::write(path, jpeg.encoder().bytes()).map_err(|e| ExifError::WriteImage {
            path: path.to_path_buf(),
            source: e,
        })?;

        debug!(path = %path.display(), "embedded metadata");
        Ok(())
    }
}

/// UTF-16LE with a trailing null terminator, the encoding Windows expects
/// for the XP* tag family.
fn encode_utf16le(value: &str) -> Vec<u8> {
    let mut bytes: Vec<u8> = value
        .encode_utf16()
        .flat_map(|unit| unit.to_le_bytes())
        .collect();
    bytes.push(0);
    bytes.push(0);
    bytes
}

/// Builds an XP* tag (UTF-16LE byte payload, primary-image group).
fn xp_text_tag(tag_id: u16, value: &str) -> Result<ExifTag, ExifError> {
    let raw_data = encode_utf16le(value);
    ExifTag::from_u16_with_data(
        tag_id,
        &ExifTagFormat::INT8U,
        &raw_data,
        &Endian::Little,
        &ExifTagGroup::GENERIC,
    )
    .map_err(|e| ExifError::EncodeTag {
        tag_id,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_metadata() -> ImageMetadata {
        ImageMetadata {
            title: "Harbor at dawn".to_string(),
            description: "Fishing boats in morning fog".to_string(),
            keywords: vec!["harbor".to_string(), "dawn".to_string(), "fog".to_string()],
        }
    }

    /// Minimal JPEG carrying an EXIF APP1 segment with a Make tag.
    fn jpeg_with_exif() -> Vec<u8> {
        let mut container = Metadata::new();
        container.set_tag(ExifTag::Make("unit-test-camera".to_string()));
        let app1 = container.as_u8_vec(FileExtension::JPEG).unwrap();

        let mut bytes = vec![0xFF, 0xD8]; // SOI
        bytes.extend_from_slice(&app1);
        // Minimal SOS header so the segment parser accepts the file
        bytes.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
        bytes.extend_from_slice(&[0xFF, 0xD9]); // EOI
        bytes
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_embed_writes_all_three_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("image.jpg");
        std::fs::write(&path, jpeg_with_exif()).unwrap();

        let writer = ExifWriter::new();
        writer.embed(&path, &sample_metadata()).unwrap();

        let written = std::fs::read(&path).unwrap();
        // Title and joined keywords are stored as UTF-16LE
        assert!(contains(&written, &encode_utf16le("Harbor at dawn")));
        assert!(contains(&written, &encode_utf16le("harbor, dawn, fog")));
        // Description is stored as 8-bit text
        assert!(contains(&written, b"Fishing boats in morning fog"));
    }

    #[test]
    fn test_embed_preserves_existing_tags() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("image.jpg");
        std::fs::write(&path, jpeg_with_exif()).unwrap();

        let writer = ExifWriter::new();
        writer.embed(&path, &sample_metadata()).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert!(contains(&written, b"unit-test-camera"));
    }

    #[test]
    fn test_embed_result_is_still_a_jpeg() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("image.jpg");
        std::fs::write(&path, jpeg_with_exif()).unwrap();

        let writer = ExifWriter::new();
        writer.embed(&path, &sample_metadata()).unwrap();

        let written = std::fs::read(&path).unwrap();
        let jpeg = Jpeg::from_bytes(Bytes::from(written)).unwrap();
        assert!(jpeg.exif().is_some());
    }

    #[test]
    fn test_embed_rejects_non_jpeg_and_leaves_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fake.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let writer = ExifWriter::new();
        let result = writer.embed(&path, &sample_metadata());

        assert!(matches!(result, Err(ExifError::ParseJpeg { .. })));
        assert_eq!(std::fs::read(&path).unwrap(), b"definitely not a jpeg");
    }

    #[test]
    fn test_embed_rejects_jpeg_without_exif() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bare.jpg");
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        std::fs::write(&path, &bytes).unwrap();

        let writer = ExifWriter::new();
        let result = writer.embed(&path, &sample_metadata());

        assert!(matches!(result, Err(ExifError::MissingContainer { .. })));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_embed_keeps_exif_ahead_of_image_data() {
        // Fixture has only two segments (APP1, SOS), fewer than a full
        // camera JPEG; the rewritten EXIF must land before the SOS.
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tiny.jpg");
        std::fs::write(&path, jpeg_with_exif()).unwrap();

        let writer = ExifWriter::new();
        writer.embed(&path, &sample_metadata()).unwrap();

        let written = std::fs::read(&path).unwrap();
        assert_eq!(&written[0..2], [0xFF, 0xD8]);
        assert_eq!(&written[2..4], [0xFF, 0xE1]);
        let jpeg = Jpeg::from_bytes(Bytes::from(written)).unwrap();
        assert!(jpeg.exif().is_some());
    }

    #[test]
    fn test_embed_malformed_container_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corrupt.jpg");

        // APP1 segment advertising EXIF but carrying garbage TIFF data
        let payload = b"Exif\x00\x00NOT A TIFF HEADER";
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend_from_slice(&[0xFF, 0xE1]);
        bytes.extend_from_slice(&((payload.len() as u16 + 2).to_be_bytes()));
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        std::fs::write(&path, &bytes).unwrap();

        let writer = ExifWriter::new();
        let result = writer.embed(&path, &sample_metadata());

        assert!(matches!(result, Err(ExifError::LoadContainer { .. })));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_embed_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ghost.jpg");

        let writer = ExifWriter::new();
        let result = writer.embed(&path, &sample_metadata());

        assert!(matches!(result, Err(ExifError::ReadImage { .. })));
    }

    #[test]
    fn test_encode_utf16le() {
        assert_eq!(encode_utf16le("AB"), vec![0x41, 0x00, 0x42, 0x00, 0x00, 0x00]);
        assert_eq!(encode_utf16le(""), vec![0x00, 0x00]);
    }
}
