//! The buffered random-access record reader.

mod buffer;
mod record;

pub use record::Record;

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use memmap2::Mmap;

use buffer::RecordBuffer;

use crate::decimate::Resolution;
use crate::error::{Result, ShpError};
use crate::geometry::{BoundingBox, Geometry};
use crate::handler::{handler_for, read_bbox, require, ShapeHandler};
use crate::header::{ShpHeader, HEADER_LENGTH};
use crate::index::RecordIndex;
use crate::shape_type::ShapeType;

/// Options applied at reader construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderOptions {
    /// Thin coordinate density against this resolution while decoding.
    /// `None` decodes at full density.
    pub decimation: Option<Resolution>,

    /// Reject data-quality shortcuts (missing measure blocks, parts below
    /// the format's minimum vertex counts) that are tolerated by default.
    pub strict: bool,
}

/// A streaming and random-access reader over the records of one `.shp`
/// file.
///
/// The reader owns the byte window into the file and a single decode
/// handler picked from the file-level shape type. Sequential iteration
/// validates that record numbers increase by exactly one and can be guided
/// by a sparse [`RecordIndex`]; the first [`ShpReader::go_to`] permanently
/// abandons both in favor of raw offsets.
///
/// A reader is not safe to share across threads; callers wanting parallel
/// access open one reader per thread. Closing is dropping: the byte source
/// and index collaborator are released when the reader goes out of scope,
/// including when construction fails after they were opened.
pub struct ShpReader<R: Read> {
    buffer: RecordBuffer<R>,
    header: ShpHeader,
    handler: Box<dyn ShapeHandler>,
    index: Option<Box<dyn RecordIndex>>,
    /// Number of the most recently consumed record; 0 before the first.
    current_record: u32,
    /// Offset of the next record header for sequential iteration.
    next_offset: u64,
    /// Cleared by the first `go_to`, together with the index.
    sequential: bool,
}

impl ShpReader<File> {
    /// Open a file through a read-only memory map of its whole length.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ReaderOptions::default())
    }

    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ReaderOptions) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_buffer(RecordBuffer::mapped(mmap), None, options)
    }
}

impl<R: Read> ShpReader<R> {
    /// Read from a byte channel through a growable window. Random access
    /// additionally needs `R: Seek`.
    pub fn new(source: R) -> Result<Self> {
        Self::with_options(source, ReaderOptions::default())
    }

    pub fn with_options(source: R, options: ReaderOptions) -> Result<Self> {
        Self::from_buffer(RecordBuffer::channel(source), None, options)
    }

    /// Read from a byte channel guided by a sparse index, which supplies
    /// the offset of each record during sequential iteration and so
    /// supports files with gaps between records.
    pub fn with_index(
        source: R,
        index: Box<dyn RecordIndex>,
        options: ReaderOptions,
    ) -> Result<Self> {
        Self::from_buffer(RecordBuffer::channel(source), Some(index), options)
    }

    fn from_buffer(
        mut buffer: RecordBuffer<R>,
        index: Option<Box<dyn RecordIndex>>,
        options: ReaderOptions,
    ) -> Result<Self> {
        let header = {
            let head = buffer.slice(0, HEADER_LENGTH as usize, "file header")?;
            ShpHeader::parse(head)?
        };
        let handler = handler_for(header.shape_type(), &options)?;
        Ok(Self {
            buffer,
            header,
            handler,
            index,
            current_record: 0,
            next_offset: HEADER_LENGTH,
            sequential: true,
        })
    }

    pub fn header(&self) -> &ShpHeader {
        &self.header
    }

    /// Whether another record is available at the cursor. A short tail and,
    /// during sequential iteration, an unexpected record number both read
    /// as a clean end of stream, never as an error.
    pub fn has_next(&mut self) -> Result<bool> {
        let offset = match self.next_header_offset() {
            None => return Ok(false),
            Some(offset) => offset,
        };
        match self.buffer.try_slice(offset, 8)? {
            None => Ok(false),
            Some(header) => {
                if self.sequential {
                    Ok(BigEndian::read_u32(&header[0..4]) == self.current_record + 1)
                } else {
                    Ok(true)
                }
            }
        }
    }

    /// Read the record at the cursor and advance past it.
    ///
    /// The record header fields and the leading bounding coordinates are
    /// parsed eagerly so the bounding box is available without forcing a
    /// geometry decode; the returned [`Record`] decodes lazily from the
    /// loaded window.
    pub fn next_record(&mut self) -> Result<Record<'_>> {
        let offset = self.next_header_offset().ok_or_else(|| {
            ShpError::Truncated("no further record in the index".to_string())
        })?;
        self.read_record_at(offset)
    }

    /// Iterate the remaining records sequentially, decoding each geometry.
    pub fn geometries(&mut self) -> Geometries<'_, R> {
        Geometries { reader: self }
    }

    /// Release the byte source and the index collaborator. Dropping the
    /// reader has the same effect.
    pub fn close(self) {}

    fn next_header_offset(&self) -> Option<u64> {
        if self.sequential {
            if let Some(index) = &self.index {
                return index.entry(self.current_record + 1).map(|entry| entry.offset);
            }
        }
        Some(self.next_offset)
    }

    fn read_record_at(&mut self, offset: u64) -> Result<Record<'_>> {
        let (number, words) = {
            let header = self.buffer.slice(offset, 8, "record header")?;
            (
                BigEndian::read_u32(&header[0..4]),
                BigEndian::read_i32(&header[4..8]),
            )
        };
        let content_length = content_length_from_words(words, offset)?;
        if self.sequential && number != self.current_record + 1 {
            return Err(ShpError::Format(format!(
                "record number {number} where {} was expected",
                self.current_record + 1
            )));
        }

        let file_type = self.header.shape_type();
        let content = self.buffer.slice(offset + 8, content_length, "record content")?;
        let (shape_type, bbox) = peek_record_head(content, file_type)?;

        self.current_record = number;
        self.next_offset = offset + 8 + content_length as u64;

        Ok(Record {
            number,
            content_length,
            shape_type,
            bbox,
            offset,
            payload: &content[4..],
            handler: self.handler.as_ref(),
            shape: None,
        })
    }
}

impl<R: Read + Seek> ShpReader<R> {
    /// Re-point the cursor at an arbitrary record offset.
    ///
    /// Random access and sparse-file support are mutually exclusive: once a
    /// raw offset is used the reader can no longer infer where "record N+1"
    /// lives, so the sparse index and sequential record-number validation
    /// are both permanently disabled.
    pub fn go_to(&mut self, offset: u64) -> Result<()> {
        if offset < HEADER_LENGTH {
            return Err(ShpError::Format(format!(
                "offset {offset} is inside the file header"
            )));
        }
        if let Some(len) = self.buffer.known_len() {
            if offset >= len {
                return Err(ShpError::Format(format!(
                    "offset {offset} is beyond the end of the {len} byte file"
                )));
            }
        }
        self.index = None;
        self.sequential = false;
        self.buffer.reposition(offset)?;
        self.next_offset = offset;
        Ok(())
    }

    /// Read the record whose header starts at `offset`.
    pub fn record_at(&mut self, offset: u64) -> Result<Record<'_>> {
        self.go_to(offset)?;
        self.read_record_at(offset)
    }

    /// Decode the geometry of the record whose header starts at `offset`.
    pub fn shape_at(&mut self, offset: u64) -> Result<Geometry> {
        self.record_at(offset)?.into_shape()
    }

    /// The total number of non-null records. The cursor is re-homed to its
    /// position before the call.
    pub fn count(&mut self) -> Result<u32> {
        let resume = self.next_offset;
        self.buffer.reposition(HEADER_LENGTH)?;
        let mut offset = HEADER_LENGTH;
        let mut count = 0u32;
        loop {
            let words = match self.buffer.try_slice(offset, 8)? {
                None => break,
                Some(header) => BigEndian::read_i32(&header[4..8]),
            };
            let content_length = content_length_from_words(words, offset)?;
            match self.buffer.try_slice(offset + 8, 4)? {
                None => {
                    return Err(ShpError::Truncated(format!(
                        "record at offset {offset} ends inside its content"
                    )))
                }
                Some(code) => {
                    if LittleEndian::read_i32(code) != i32::from(ShapeType::Null) {
                        count += 1;
                    }
                }
            }
            offset += 8 + content_length as u64;
        }
        self.buffer.reposition(resume)?;
        Ok(count)
    }

    /// Copy record `record_number`'s raw bytes (header included) into
    /// `dst` without materializing a geometry, and extract its bounding box
    /// for the destination's own index. Returns the byte count written.
    ///
    /// The record is located through the sparse index when one is attached,
    /// and by scanning record headers from the first record otherwise. The
    /// cursor is re-homed afterwards.
    pub fn transfer_to<W: Write>(
        &mut self,
        dst: &mut W,
        record_number: u32,
    ) -> Result<(usize, BoundingBox)> {
        let resume = self.next_offset;
        let offset = match &self.index {
            Some(index) => {
                index
                    .entry(record_number)
                    .ok_or_else(|| {
                        ShpError::Format(format!("record {record_number} is not in the index"))
                    })?
                    .offset
            }
            None => self.scan_to_record(record_number)?,
        };
        self.buffer.reposition(offset)?;

        let words = {
            let header = self.buffer.slice(offset, 8, "record header")?;
            BigEndian::read_i32(&header[4..8])
        };
        let content_length = content_length_from_words(words, offset)?;
        let total = 8 + content_length;

        let file_type = self.header.shape_type();
        let full = self.buffer.slice(offset, total, "record")?;
        let (_, bbox) = peek_record_head(&full[8..], file_type)?;
        dst.write_all(full)?;

        self.buffer.reposition(resume)?;
        Ok((total, bbox))
    }

    fn scan_to_record(&mut self, record_number: u32) -> Result<u64> {
        self.buffer.reposition(HEADER_LENGTH)?;
        let mut offset = HEADER_LENGTH;
        loop {
            let (number, words) = match self.buffer.try_slice(offset, 8)? {
                None => {
                    return Err(ShpError::Format(format!(
                        "record {record_number} not found in the file"
                    )))
                }
                Some(header) => (
                    BigEndian::read_u32(&header[0..4]),
                    BigEndian::read_i32(&header[4..8]),
                ),
            };
            let content_length = content_length_from_words(words, offset)?;
            if number == record_number {
                return Ok(offset);
            }
            offset += 8 + content_length as u64;
        }
    }
}

/// Sequential iterator over decoded geometries, created by
/// [`ShpReader::geometries`].
pub struct Geometries<'a, R: Read> {
    reader: &'a mut ShpReader<R>,
}

impl<R: Read> Iterator for Geometries<'_, R> {
    type Item = Result<Geometry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.has_next() {
            Err(err) => Some(Err(err)),
            Ok(false) => None,
            Ok(true) => Some(
                self.reader
                    .next_record()
                    .and_then(|record| record.into_shape()),
            ),
        }
    }
}

fn content_length_from_words(words: i32, offset: u64) -> Result<usize> {
    // the length field counts 16-bit words; 2 words cover the shape code
    if words < 2 {
        return Err(ShpError::Format(format!(
            "record at offset {offset} declares a content length of {words} words"
        )));
    }
    Ok(words as usize * 2)
}

/// Validate a record's shape-type code against the file-level type and peek
/// its leading bounding coordinates without consuming the payload.
fn peek_record_head(content: &[u8], file_type: ShapeType) -> Result<(ShapeType, BoundingBox)> {
    let shape_type = ShapeType::parse(LittleEndian::read_i32(&content[0..]))?;
    if shape_type != ShapeType::Null && shape_type != file_type {
        return Err(ShpError::Format(format!(
            "record of type {shape_type} in a {file_type} file"
        )));
    }
    let bbox = if shape_type == ShapeType::Null {
        BoundingBox::new(0.0, 0.0, 0.0, 0.0)
    } else if shape_type.is_point_kind() {
        require(&content[4..], 16, "point coordinate")?;
        BoundingBox::from_point(
            LittleEndian::read_f64(&content[4..]),
            LittleEndian::read_f64(&content[12..]),
        )
    } else {
        require(&content[4..], 32, "record bounding box")?;
        read_bbox(content, 4)
    };
    Ok((shape_type, bbox))
}
