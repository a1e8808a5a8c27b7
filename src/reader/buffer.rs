use std::io::{Read, Seek, SeekFrom};

use memmap2::Mmap;

use crate::error::{Result, ShpError};

const INITIAL_CAPACITY: usize = 8 * 1024;

/// The byte window into the main file.
///
/// Both variants expose the same contract: hand out `len` bytes at an
/// absolute file offset, loading them first if necessary. The mapped variant
/// already spans the whole file, so growth and repositioning are no-ops; the
/// channel variant keeps a growable window that is compacted as it advances
/// and doubled when a record does not fit.
pub(crate) enum RecordBuffer<R> {
    Mapped(Mmap),
    Channel(ChannelBuffer<R>),
}

pub(crate) struct ChannelBuffer<R> {
    source: R,
    data: Vec<u8>,
    /// File offset of `data[0]`.
    window_start: u64,
    /// Valid bytes at the front of `data`.
    filled: usize,
}

impl<R: Read> RecordBuffer<R> {
    pub(crate) fn mapped(mmap: Mmap) -> Self {
        RecordBuffer::Mapped(mmap)
    }

    pub(crate) fn channel(source: R) -> Self {
        Self::channel_with_capacity(source, INITIAL_CAPACITY)
    }

    pub(crate) fn channel_with_capacity(source: R, capacity: usize) -> Self {
        RecordBuffer::Channel(ChannelBuffer {
            source,
            data: vec![0; capacity.max(1)],
            window_start: 0,
            filled: 0,
        })
    }

    /// `len` bytes at `offset`, or [`ShpError::Truncated`] when the file
    /// ends first.
    pub(crate) fn slice(&mut self, offset: u64, len: usize, what: &str) -> Result<&[u8]> {
        match self.try_slice(offset, len)? {
            Some(slice) => Ok(slice),
            None => Err(ShpError::Truncated(format!(
                "{what} at offset {offset} needs {len} bytes"
            ))),
        }
    }

    /// Like [`Self::slice`], but a clean end of input is `Ok(None)` instead
    /// of an error.
    pub(crate) fn try_slice(&mut self, offset: u64, len: usize) -> Result<Option<&[u8]>> {
        match self {
            RecordBuffer::Mapped(mmap) => {
                match (offset as usize).checked_add(len) {
                    Some(end) if end <= mmap.len() => Ok(Some(&mmap[offset as usize..end])),
                    _ => Ok(None),
                }
            }
            RecordBuffer::Channel(channel) => channel.try_slice(offset, len),
        }
    }

    /// The total byte length, when the buffer spans the whole file.
    pub(crate) fn known_len(&self) -> Option<u64> {
        match self {
            RecordBuffer::Mapped(mmap) => Some(mmap.len() as u64),
            RecordBuffer::Channel(_) => None,
        }
    }
}

impl<R: Read> ChannelBuffer<R> {
    fn try_slice(&mut self, offset: u64, len: usize) -> Result<Option<&[u8]>> {
        if offset < self.window_start {
            return Err(ShpError::UnsupportedOperation(format!(
                "cannot move backwards to offset {offset} on a forward-only source"
            )));
        }

        // Compact: drop the bytes before the requested offset, discarding
        // from the source when the window is skipped past entirely.
        let skip = (offset - self.window_start) as usize;
        if skip > 0 {
            if skip >= self.filled {
                let discard = (skip - self.filled) as u64;
                if discard > 0 {
                    std::io::copy(&mut (&mut self.source).take(discard), &mut std::io::sink())?;
                }
                self.filled = 0;
            } else {
                self.data.copy_within(skip..self.filled, 0);
                self.filled -= skip;
            }
            self.window_start = offset;
        }

        // An oversized record doubles the window until it fits.
        if len > self.data.len() {
            let mut capacity = self.data.len();
            while capacity < len {
                capacity *= 2;
            }
            self.data.resize(capacity, 0);
        }

        while self.filled < len {
            let n = self.source.read(&mut self.data[self.filled..])?;
            if n == 0 {
                return Ok(None);
            }
            self.filled += n;
        }
        Ok(Some(&self.data[..len]))
    }
}

impl<R: Read + Seek> RecordBuffer<R> {
    /// Re-point the window at an arbitrary file offset.
    pub(crate) fn reposition(&mut self, offset: u64) -> Result<()> {
        match self {
            RecordBuffer::Mapped(_) => Ok(()),
            RecordBuffer::Channel(channel) => {
                channel.source.seek(SeekFrom::Start(offset))?;
                channel.window_start = offset;
                channel.filled = 0;
                Ok(())
            }
        }
    }
}
