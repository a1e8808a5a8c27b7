use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Result, ShpError};
use crate::geometry::BoundingBox;
use crate::handler::read_bbox;
use crate::shape_type::ShapeType;

/// The number of bytes in the fixed file preamble.
pub const HEADER_LENGTH: u64 = 100;

const MAGIC_NUMBER: i32 = 9994;
const VERSION: i32 = 1000;

/// The 100-byte file preamble, parsed once at open time.
///
/// The declared shape type governs the whole file: every record must carry
/// the same code or the Null sentinel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShpHeader {
    shape_type: ShapeType,
    bbox: BoundingBox,
    z_min: f64,
    z_max: f64,
    file_length: u64,
}

impl ShpHeader {
    /// Parse the preamble from the first 100 bytes of the file.
    pub(crate) fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LENGTH as usize {
            return Err(ShpError::Truncated(format!(
                "file header needs {HEADER_LENGTH} bytes, {} available",
                buf.len()
            )));
        }
        let magic = BigEndian::read_i32(&buf[0..]);
        if magic != MAGIC_NUMBER {
            return Err(ShpError::Format(format!(
                "wrong magic number: found {magic}, expected {MAGIC_NUMBER}"
            )));
        }
        let version = LittleEndian::read_i32(&buf[28..]);
        if version != VERSION {
            return Err(ShpError::Format(format!(
                "wrong version: found {version}, expected {VERSION}"
            )));
        }
        // length is stored in 16-bit words
        let file_length = BigEndian::read_i32(&buf[24..]) as u64 * 2;
        let shape_type = ShapeType::parse(LittleEndian::read_i32(&buf[32..]))?;
        Ok(Self {
            shape_type,
            bbox: read_bbox(buf, 36),
            z_min: LittleEndian::read_f64(&buf[68..]),
            z_max: LittleEndian::read_f64(&buf[76..]),
            file_length,
        })
    }

    /// The shape type declared for every record in the file.
    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    /// The file-wide 2-D bounding box.
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// The file-wide z range; zero for 2-D files.
    pub fn z_range(&self) -> (f64, f64) {
        (self.z_min, self.z_max)
    }

    /// The total file length in bytes, header included, as declared by the
    /// preamble.
    pub fn file_length(&self) -> u64 {
        self.file_length
    }
}

#[cfg(test)]
pub(crate) fn write_header(out: &mut Vec<u8>, shape_type: ShapeType, file_length: u64) {
    use byteorder::WriteBytesExt;
    use std::io::Write;

    out.write_i32::<BigEndian>(MAGIC_NUMBER).unwrap();
    out.write_all(&[0; 20]).unwrap();
    out.write_i32::<BigEndian>((file_length / 2) as i32).unwrap();
    out.write_i32::<LittleEndian>(VERSION).unwrap();
    out.write_i32::<LittleEndian>(i32::from(shape_type)).unwrap();
    // file bounding box and z/m ranges
    for _ in 0..8 {
        out.write_f64::<LittleEndian>(0.0).unwrap();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_round_trip() {
        let mut buf = Vec::new();
        write_header(&mut buf, ShapeType::PolyLineZ, 1234);
        assert_eq!(buf.len(), HEADER_LENGTH as usize);

        let header = ShpHeader::parse(&buf).unwrap();
        assert_eq!(header.shape_type(), ShapeType::PolyLineZ);
        assert_eq!(header.file_length(), 1234);
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut buf = Vec::new();
        write_header(&mut buf, ShapeType::Point, 100);
        buf[0] = 0xff;
        assert!(matches!(ShpHeader::parse(&buf), Err(ShpError::Format(_))));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut buf = Vec::new();
        write_header(&mut buf, ShapeType::Point, 100);
        buf[28..32].copy_from_slice(&999i32.to_le_bytes());
        assert!(matches!(ShpHeader::parse(&buf), Err(ShpError::Format(_))));
    }

    #[test]
    fn short_header_is_truncated() {
        assert!(matches!(
            ShpHeader::parse(&[0; 50]),
            Err(ShpError::Truncated(_))
        ));
    }

    #[test]
    fn unknown_shape_code_is_rejected() {
        let mut buf = Vec::new();
        write_header(&mut buf, ShapeType::Point, 100);
        buf[32..36].copy_from_slice(&31i32.to_le_bytes());
        assert!(matches!(ShpHeader::parse(&buf), Err(ShpError::Format(_))));
    }
}
