//! Incremental boundary scanner for self-delimiting frames.
//!
//! A msgpack value is a tree of items: a marker byte, an optional length or
//! count, and either raw data or further items. The scanner walks that tree
//! one item at a time and keeps its position between calls, so bytes that
//! arrive in many small reads are each inspected once.

use rmp::Marker;

use crate::error::{ClientError, Result};

/// One msgpack item: its own encoded size and how many items follow it.
#[derive(Debug, Clone, Copy)]
struct Item {
    size: usize,
    children: usize,
}

impl Item {
    fn scalar(size: usize) -> Self {
        Self { size, children: 0 }
    }
}

/// Resumable scan for the end of the first msgpack value in a buffer.
#[derive(Debug, Clone)]
pub(crate) struct ValueScanner {
    /// Bytes of fully measured items.
    offset: usize,
    /// Items still to measure before the value is complete.
    pending: usize,
}

impl Default for ValueScanner {
    fn default() -> Self {
        Self {
            offset: 0,
            pending: 1,
        }
    }
}

impl ValueScanner {
    /// Bytes already known to belong to the current value.
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Forget progress; the next scan starts a new value at byte 0.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Continue scanning `buf`, which must start with the same bytes as on
    /// the previous call.
    ///
    /// Returns the length of the value once it is complete, after which the
    /// scanner is reset.
    ///
    /// # Errors
    ///
    /// Returns `OversizedPayload` as soon as the declared sizes already seen
    /// exceed `max`, and `MalformedEnvelope` on the reserved marker.
    pub(crate) fn scan(&mut self, buf: &[u8], max: usize) -> Result<Option<usize>> {
        while self.pending > 0 {
            let rest = &buf[self.offset..];
            let Some(item) = measure(rest)? else {
                return Ok(None);
            };

            // Every pending item takes at least one more byte.
            let pending = (self.pending - 1).saturating_add(item.children);
            let at_least = self.offset.saturating_add(item.size).saturating_add(pending);
            if at_least > max {
                return Err(ClientError::OversizedPayload { size: at_least, max });
            }

            if rest.len() < item.size {
                return Ok(None);
            }

            self.offset += item.size;
            self.pending = pending;
        }

        let len = self.offset;
        self.reset();
        Ok(Some(len))
    }
}

/// Big-endian unsigned integer of `width` bytes following the marker.
fn read_len(buf: &[u8], width: usize) -> Option<usize> {
    let bytes = buf.get(1..1 + width)?;
    Some(bytes.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize))
}

/// Item with a length field and `extra` bytes (ext type) before its data.
fn sized(buf: &[u8], width: usize, extra: usize) -> Option<Item> {
    let len = read_len(buf, width)?;
    Some(Item::scalar((1 + width + extra).saturating_add(len)))
}

/// Container header with a count field; maps hold two items per entry.
fn counted(buf: &[u8], width: usize, per_entry: usize) -> Option<Item> {
    let count = read_len(buf, width)?;
    Some(Item {
        size: 1 + width,
        children: count.saturating_mul(per_entry),
    })
}

/// Size of the item at the front of `buf`, or `None` if its header is cut
/// short.
fn measure(buf: &[u8]) -> Result<Option<Item>> {
    let Some(&first) = buf.first() else {
        return Ok(None);
    };

    let item = match Marker::from_u8(first) {
        Marker::FixPos(_) | Marker::FixNeg(_) | Marker::Null | Marker::True | Marker::False => {
            Some(Item::scalar(1))
        }
        Marker::U8 | Marker::I8 => Some(Item::scalar(2)),
        Marker::U16 | Marker::I16 => Some(Item::scalar(3)),
        Marker::U32 | Marker::I32 | Marker::F32 => Some(Item::scalar(5)),
        Marker::U64 | Marker::I64 | Marker::F64 => Some(Item::scalar(9)),
        Marker::FixStr(n) => Some(Item::scalar(1 + n as usize)),
        Marker::Str8 | Marker::Bin8 => sized(buf, 1, 0),
        Marker::Str16 | Marker::Bin16 => sized(buf, 2, 0),
        Marker::Str32 | Marker::Bin32 => sized(buf, 4, 0),
        Marker::FixExt1 => Some(Item::scalar(3)),
        Marker::FixExt2 => Some(Item::scalar(4)),
        Marker::FixExt4 => Some(Item::scalar(6)),
        Marker::FixExt8 => Some(Item::scalar(10)),
        Marker::FixExt16 => Some(Item::scalar(18)),
        Marker::Ext8 => sized(buf, 1, 1),
        Marker::Ext16 => sized(buf, 2, 1),
        Marker::Ext32 => sized(buf, 4, 1),
        Marker::FixArray(n) => Some(Item {
            size: 1,
            children: n as usize,
        }),
        Marker::Array16 => counted(buf, 2, 1),
        Marker::Array32 => counted(buf, 4, 1),
        Marker::FixMap(n) => Some(Item {
            size: 1,
            children: 2 * n as usize,
        }),
        Marker::Map16 => counted(buf, 2, 2),
        Marker::Map32 => counted(buf, 4, 2),
        Marker::Reserved => {
            return Err(ClientError::MalformedEnvelope(format!(
                "reserved msgpack marker {first:#04x}"
            )))
        }
    };

    Ok(item)
}
