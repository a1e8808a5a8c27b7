use crate::error::Result;
use crate::geometry::{BoundingBox, Geometry};
use crate::handler::ShapeHandler;
use crate::shape_type::ShapeType;

/// One record of the main file.
///
/// A `Record` borrows the reader's buffer, so the borrow checker guarantees
/// the reader cannot advance or reposition while one is alive: copy out
/// whatever you need (or call [`Record::into_shape`]) before touching the
/// reader again. Repositioning therefore invalidates a record by
/// construction rather than by convention.
///
/// The header fields (number, length, shape type, bounding box) are parsed
/// eagerly; the geometry is decoded lazily, at most once per record value.
pub struct Record<'a> {
    pub(crate) number: u32,
    pub(crate) content_length: usize,
    pub(crate) shape_type: ShapeType,
    pub(crate) bbox: BoundingBox,
    pub(crate) offset: u64,
    /// Record content past the shape-type code.
    pub(crate) payload: &'a [u8],
    pub(crate) handler: &'a dyn ShapeHandler,
    pub(crate) shape: Option<Geometry>,
}

impl<'a> Record<'a> {
    /// The 1-based record number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// The record content length in bytes, record header excluded.
    pub fn content_length(&self) -> usize {
        self.content_length
    }

    /// The shape type declared by this record: the file-level type or
    /// [`ShapeType::Null`].
    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    /// The bounding box peeked from the head of the payload, available
    /// without decoding the geometry. The zero box for Null records.
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// The byte offset of this record's header from the start of the file.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Decode the geometry, memoizing the result for repeated calls.
    pub fn shape(&mut self) -> Result<&Geometry> {
        if self.shape.is_none() {
            self.shape = Some(self.handler.read(self.payload, self.shape_type)?);
        }
        Ok(self.shape.as_ref().unwrap())
    }

    /// Decode the geometry and release the record.
    pub fn into_shape(mut self) -> Result<Geometry> {
        if self.shape.is_none() {
            self.shape = Some(self.handler.read(self.payload, self.shape_type)?);
        }
        Ok(self.shape.take().unwrap())
    }

    /// A bounding-box-accurate placeholder for this record's geometry,
    /// built without decoding the payload.
    pub fn bbox_shape(&self) -> Geometry {
        if self.shape_type == ShapeType::Null {
            Geometry::Null
        } else {
            self.handler.bbox_geometry(&self.bbox)
        }
    }
}

impl std::fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("number", &self.number)
            .field("content_length", &self.content_length)
            .field("shape_type", &self.shape_type)
            .field("bbox", &self.bbox)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}
