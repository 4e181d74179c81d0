//! Flash segment structures

use crate::models::SegmentRole;
use std::borrow::Cow;
use std::path::PathBuf;

/// A binary file that has to be written at a fixed flash address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashSegment {
    pub role: SegmentRole,
    pub address: u32,
    pub path: PathBuf,
}

impl FlashSegment {
    pub fn new(role: SegmentRole, address: u32, path: impl Into<PathBuf>) -> Self {
        Self {
            role,
            address,
            path: path.into(),
        }
    }

    /// Read the file into a [`Segment`]
    pub fn load(&self) -> std::io::Result<Segment<'static>> {
        let data = std::fs::read(&self.path)?;
        Ok(Segment {
            addr: self.address,
            data: Cow::Owned(data),
        })
    }
}

/// Binary data placed at a flash address
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Flash address of the first byte
    pub addr: u32,
    /// Segment data
    pub data: Cow<'a, [u8]>,
}

impl<'a> Segment<'a> {
    /// Creates a new [`Segment`].
    pub fn new(addr: u32, data: &'a [u8]) -> Self {
        Segment {
            addr,
            data: Cow::Borrowed(data),
        }
    }

    /// Return the size of the segment
    pub fn size(&self) -> u32 {
        self.data.len() as u32
    }

    /// First address past the end of the segment
    pub fn end(&self) -> u64 {
        self.addr as u64 + self.data.len() as u64
    }

    /// Return the data of the segment
    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }
}

impl<'a> std::fmt::Debug for Segment<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("addr", &format!("0x{:x}", self.addr))
            .field("size", &self.size())
            .finish()
    }
}
