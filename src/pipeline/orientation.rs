//! EXIF orientation: read the tag, map it to a rotation, apply or copy it.
//!
//! Two consumers use this module and they must stay separate:
//!
//! * the base64 output path **rotates pixels** by [`rotation_for_file`] /
//!   [`rotation_for_bytes`] when `fixRotation` is set;
//! * the file output path never rotates pixels. It copies the source's raw
//!   tag onto the new JPEG with [`embed_orientation`], so viewers apply the
//!   same correction they would have applied to the original.
//!
//! Every read here is best-effort. A missing, unreadable, or malformed tag
//! is `None` / 0°, never an error.
//!
//! | EXIF code | Meaning | [`RotationAngle`] |
//! |---|---|---|
//! | 1 | normal | 0° |
//! | 3 | rotate 180 | 180° |
//! | 6 | rotate 90 CW | 90° |
//! | 8 | rotate 270 CW | 270° |
//! | 2, 4, 5, 7, other | mirrored / unknown | 0° |

use exif::experimental::Writer;
use exif::{Field, In, Reader, Tag, Value};
use image::DynamicImage;
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;
use tracing::debug;

pub const ORIENTATION_NORMAL: u16 = 1;
pub const ORIENTATION_ROTATE_180: u16 = 3;
pub const ORIENTATION_ROTATE_90: u16 = 6;
pub const ORIENTATION_ROTATE_270: u16 = 8;

/// Clockwise rotation needed to display an image upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RotationAngle {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl RotationAngle {
    /// Map an EXIF orientation code. Mirrored and unknown codes are 0°.
    pub fn from_exif(code: u16) -> Self {
        match code {
            ORIENTATION_ROTATE_90 => RotationAngle::Deg90,
            ORIENTATION_ROTATE_180 => RotationAngle::Deg180,
            ORIENTATION_ROTATE_270 => RotationAngle::Deg270,
            _ => RotationAngle::Deg0,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            RotationAngle::Deg0 => 0,
            RotationAngle::Deg90 => 90,
            RotationAngle::Deg180 => 180,
            RotationAngle::Deg270 => 270,
        }
    }

    /// Whether applying this rotation swaps width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, RotationAngle::Deg90 | RotationAngle::Deg270)
    }
}

fn read_orientation<R: BufRead + Seek>(reader: &mut R) -> Option<u16> {
    let exif = Reader::new().read_from_container(reader).ok()?;
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    field.value.get_uint(0).and_then(|v| u16::try_from(v).ok())
}

/// Raw orientation code of an image file. `None` if unreadable or missing.
pub fn orientation_from_path(path: &Path) -> Option<u16> {
    let file = std::fs::File::open(path).ok()?;
    read_orientation(&mut BufReader::new(file))
}

/// Raw orientation code of an encoded image in memory.
pub fn orientation_from_bytes(bytes: &[u8]) -> Option<u16> {
    read_orientation(&mut Cursor::new(bytes))
}

/// Rotation for a file-backed source.
pub fn rotation_for_file(path: &Path) -> RotationAngle {
    let code = orientation_from_path(path);
    debug!("EXIF orientation of {}: {:?}", path.display(), code);
    code.map_or(RotationAngle::Deg0, RotationAngle::from_exif)
}

/// Rotation for an inline source, read from its decoded payload.
pub fn rotation_for_bytes(bytes: &[u8]) -> RotationAngle {
    let code = orientation_from_bytes(bytes);
    debug!("EXIF orientation of inline payload: {:?}", code);
    code.map_or(RotationAngle::Deg0, RotationAngle::from_exif)
}

/// Rebuild the image rotated clockwise by `angle`. 0° returns it untouched.
pub fn rotate(image: DynamicImage, angle: RotationAngle) -> DynamicImage {
    match angle {
        RotationAngle::Deg0 => image,
        RotationAngle::Deg90 => image.rotate90(),
        RotationAngle::Deg180 => image.rotate180(),
        RotationAngle::Deg270 => image.rotate270(),
    }
}

/// Serialise a TIFF-structured EXIF block holding only the orientation tag.
fn orientation_block(code: u16) -> Result<Vec<u8>, exif::Error> {
    let field = Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![code]),
    };
    let mut writer = Writer::new();
    writer.push_field(&field);

    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false)?;
    Ok(buf.into_inner())
}

/// Return `jpeg` with its EXIF segment replaced by one carrying `code`.
pub fn embed_orientation(jpeg: &[u8], code: u16) -> Result<Vec<u8>, String> {
    let block = orientation_block(code).map_err(|e| format!("EXIF serialisation failed: {e}"))?;

    let mut parsed =
        Jpeg::from_bytes(Bytes::copy_from_slice(jpeg)).map_err(|e| format!("not a JPEG stream: {e}"))?;
    parsed.set_exif(Some(Bytes::from(block)));

    let mut out = Vec::new();
    parsed
        .encoder()
        .write_to(&mut out)
        .map_err(|e| format!("failed to re-emit JPEG: {e}"))?;
    Ok(out)
}
