//! Streaming and random-access decoding of ESRI Shapefile (`.shp`)
//! geometry, with optional on-the-fly decimation for low-resolution
//! rendering.
//!
//! The reader walks the file's length-prefixed records sequentially or, for
//! seekable sources, jumps straight to a byte offset supplied by a
//! companion index. Record decoding is lazy: the header fields and bounding
//! box of each record are available without materializing a geometry.
//!
//! ```no_run
//! use geoshp::ShpReader;
//!
//! # fn main() -> geoshp::Result<()> {
//! let mut reader = ShpReader::open("roads.shp")?;
//! while reader.has_next()? {
//!     let mut record = reader.next_record()?;
//!     println!("record {} covers {:?}", record.number(), record.bbox());
//!     println!("{:?}", record.shape()?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! For coarse previews, decimation thins coordinate density while decoding,
//! keeping rings closed and endpoints in place:
//!
//! ```no_run
//! use geoshp::{ReaderOptions, Resolution, ShpReader};
//!
//! # fn main() -> geoshp::Result<()> {
//! let options = ReaderOptions {
//!     decimation: Some(Resolution::uniform(0.01)),
//!     ..Default::default()
//! };
//! let mut reader = ShpReader::open_with_options("coastline.shp", options)?;
//! for shape in reader.geometries() {
//!     let shape = shape?;
//!     // hand the thinned geometry to the renderer
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub mod decimate;
pub mod error;
pub mod geometry;
pub mod handler;
pub mod header;
pub mod index;
pub mod reader;
pub mod shape_type;
#[cfg(test)]
pub(crate) mod test;

pub use decimate::Resolution;
pub use error::{Result, ShpError};
pub use geometry::Geometry;
pub use header::ShpHeader;
pub use index::{IndexEntry, RecordIndex};
pub use reader::{Record, ReaderOptions, ShpReader};
pub use shape_type::ShapeType;
