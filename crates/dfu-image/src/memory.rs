//! Sparse memory maps backed by Intel HEX.
//!
//! A [`MemoryMap`] holds contiguous segments keyed by start address. Writes
//! that continue an existing segment extend it, so a page written in one
//! piece can always be read back in one piece.

use std::collections::BTreeMap;

use dfu_errors::ParseError;
use ihex::Record;

/// Bytes per Intel HEX data record emitted by [`MemoryMap::to_ihex`].
const RECORD_LEN: usize = 16;

/// Sparse view of target memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryMap {
    segments: BTreeMap<u32, Vec<u8>>,
}

impl MemoryMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the map holds no data.
    pub fn is_empty(&self) -> bool {
        self.segments.values().all(Vec::is_empty)
    }

    /// Store `bytes` starting at `address`.
    ///
    /// Data continuing the segment that ends at `address` is appended to it;
    /// anything else starts a new segment. Overlapping writes replace the
    /// earlier bytes when the map is flattened.
    pub fn insert(&mut self, address: u32, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let continued = self
            .segments
            .range(..=address)
            .next_back()
            .filter(|(start, data)| u64::from(**start) + data.len() as u64 == u64::from(address))
            .map(|(start, _)| *start);
        let data = self
            .segments
            .entry(continued.unwrap_or(address))
            .or_default();
        let offset = if continued.is_some() { data.len() } else { 0 };
        for (i, byte) in bytes.iter().enumerate() {
            match data.get_mut(offset + i) {
                Some(slot) => *slot = *byte,
                None => data.push(*byte),
            }
        }
    }

    /// Iterate over `(start address, bytes)` segments in address order.
    pub fn segments(&self) -> impl Iterator<Item = (u32, &[u8])> {
        self.segments.iter().map(|(a, d)| (*a, d.as_slice()))
    }

    /// Lowest address holding data.
    pub fn start_address(&self) -> Option<u32> {
        self.segments().find(|(_, d)| !d.is_empty()).map(|(a, _)| a)
    }

    /// Read `len` bytes at `address` if a single segment covers them.
    pub fn read(&self, address: u32, len: usize) -> Option<Vec<u8>> {
        let (start, data) = self.segments.range(..=address).next_back()?;
        let offset = usize::try_from(address - start).ok()?;
        data.get(offset..offset.checked_add(len)?).map(<[u8]>::to_vec)
    }

    /// Flatten everything at or above `floor` into one buffer.
    ///
    /// Gaps between segments are filled with `0xFF`, the erased flash value.
    /// Returns the start address of the buffer together with its bytes.
    pub fn flatten_from(&self, floor: u32) -> Option<(u32, Vec<u8>)> {
        self.flatten_within(floor, u64::from(u32::MAX) + 1)
    }

    /// Flatten the data in `floor..ceiling` into one buffer.
    ///
    /// Bytes outside the window are dropped before the span is measured.
    pub fn flatten_within(&self, floor: u32, ceiling: u64) -> Option<(u32, Vec<u8>)> {
        let floor64 = u64::from(floor);
        let windows: Vec<(u64, u64)> = self
            .segments()
            .filter_map(|(a, d)| {
                let lo = u64::from(a).max(floor64);
                let hi = (u64::from(a) + d.len() as u64).min(ceiling);
                (lo < hi).then_some((lo, hi))
            })
            .collect();
        let start = windows.iter().map(|(lo, _)| *lo).min()?;
        let end = windows.iter().map(|(_, hi)| *hi).max()?;
        let len = usize::try_from(end - start).ok()?;
        let mut out = vec![0xFF; len];

        for (a, d) in self.segments() {
            for (i, byte) in d.iter().enumerate() {
                let addr = u64::from(a) + i as u64;
                if addr < start || addr >= end {
                    continue;
                }
                if let Some(slot) = usize::try_from(addr - start)
                    .ok()
                    .and_then(|idx| out.get_mut(idx))
                {
                    *slot = *byte;
                }
            }
        }
        Some((u32::try_from(start).ok()?, out))
    }

    /// Parse Intel HEX text.
    pub fn from_ihex(text: &str) -> Result<Self, ParseError> {
        let mut map = MemoryMap::new();
        let mut base: u32 = 0;

        for record in ihex::Reader::new(text) {
            let record = record.map_err(|e| ParseError::InvalidHex(e.to_string()))?;
            match record {
                Record::Data { offset, value } => {
                    let address = base.checked_add(u32::from(offset)).ok_or_else(|| {
                        ParseError::InvalidHex("data record beyond 32-bit address space".into())
                    })?;
                    map.insert(address, &value);
                }
                Record::ExtendedLinearAddress(upper) => base = u32::from(upper) << 16,
                Record::ExtendedSegmentAddress(segment) => base = u32::from(segment) << 4,
                Record::EndOfFile => break,
                Record::StartLinearAddress(_) | Record::StartSegmentAddress { .. } => {}
            }
        }
        Ok(map)
    }

    /// Render the map as Intel HEX text.
    pub fn to_ihex(&self) -> Result<String, ParseError> {
        let mut records = Vec::new();
        let mut upper: Option<u16> = None;

        for (start, data) in self.segments() {
            let mut address = start;
            let mut rest = data;
            while !rest.is_empty() {
                let segment_upper = (address >> 16) as u16;
                if upper != Some(segment_upper) {
                    records.push(Record::ExtendedLinearAddress(segment_upper));
                    upper = Some(segment_upper);
                }
                // Records never straddle a 64 KiB boundary.
                let to_boundary = 0x1_0000 - (address & 0xFFFF) as usize;
                let take = rest.len().min(RECORD_LEN).min(to_boundary);
                let (chunk, tail) = rest.split_at(take);
                records.push(Record::Data {
                    offset: (address & 0xFFFF) as u16,
                    value: chunk.to_vec(),
                });
                rest = tail;
                address = address.wrapping_add(take as u32);
            }
        }
        records.push(Record::EndOfFile);

        ihex::create_object_file_representation(&records)
            .map_err(|e| ParseError::InvalidHex(e.to_string()))
    }
}
