//! Virus "Single Dump" extraction from demultiplexed MIDI track events.

use anyhow::{anyhow, Result};

/// Size of a decoded Virus single-patch parameter block
pub const PARAM_BLOCK_SIZE: usize = 256;

/// Minimum length of a sysex message that can carry a single dump
pub const SINGLE_DUMP_MIN_LEN: usize = 265;

/// Message-type byte identifying a Virus "Single Dump"
pub const SINGLE_DUMP_ID: u8 = 0x10;

/// Offset of the first parameter byte inside the sysex payload
const PARAM_DATA_START: usize = 8;

/// Decoded Virus patch dump: 256 parameter bytes, index-addressed.
///
/// Immutable once extracted; indices follow the Virus single-parameter
/// numbering (page A at 0-127, page B at 128-255).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBlock {
    data: [u8; PARAM_BLOCK_SIZE],
}

impl ParameterBlock {
    /// Build a block from raw bytes. Anything other than exactly 256 bytes
    /// is a decode error.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != PARAM_BLOCK_SIZE {
            return Err(anyhow!(
                "parameter block must be {} bytes, got {}",
                PARAM_BLOCK_SIZE,
                data.len()
            ));
        }
        let mut buf = [0u8; PARAM_BLOCK_SIZE];
        buf.copy_from_slice(data);
        Ok(Self { data: buf })
    }

    /// Raw byte at `index` (0-255).
    pub fn get(&self, index: usize) -> u8 {
        self.data[index]
    }

    /// All 256 bytes in index order.
    pub fn bytes(&self) -> &[u8; PARAM_BLOCK_SIZE] {
        &self.data
    }

    /// Patch name stored in the dump (indices 240-249), if it holds
    /// printable ASCII. Dumps from some editors leave these bytes zeroed.
    pub fn patch_name(&self) -> Option<String> {
        let raw = &self.data[240..250];
        if raw.iter().any(|&b| b != 0x00 && !(0x20..0x7f).contains(&b)) {
            return None;
        }
        let name: String = raw
            .iter()
            .filter(|&&b| b != 0x00)
            .map(|&b| b as char)
            .collect::<String>()
            .trim()
            .to_string();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

/// One demultiplexed MIDI track event, as handed over by the MIDI file
/// reader. Only the event kind and raw payload matter here.
#[derive(Debug, Clone)]
pub struct TrackEvent {
    /// Coarse event classification.
    pub kind: EventKind,
    /// Raw payload as framed on the wire, without the status byte.
    pub data: Vec<u8>,
}

/// Coarse event classification used by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// System-exclusive message.
    SysEx,
    /// Anything else; never inspected.
    Other,
}

/// Scan track events for Virus single dumps and extract one
/// [`ParameterBlock`] per match, in event order.
///
/// A candidate must be a sysex event of at least 265 bytes whose sixth
/// byte is the single-dump id; the block is payload bytes 8..264. Tracks
/// with no candidates yield an empty vec, not an error.
pub fn extract_blocks(events: &[TrackEvent]) -> Vec<ParameterBlock> {
    let mut blocks = Vec::new();

    for event in events {
        if event.kind != EventKind::SysEx {
            continue;
        }
        if event.data.len() < SINGLE_DUMP_MIN_LEN {
            continue;
        }
        if event.data[5] != SINGLE_DUMP_ID {
            continue;
        }

        let raw = &event.data[PARAM_DATA_START..PARAM_DATA_START + PARAM_BLOCK_SIZE];
        match ParameterBlock::from_bytes(raw) {
            Ok(block) => blocks.push(block),
            // Unreachable with the length guard above, but keep the decode
            // path honest rather than panicking on a bad slice.
            Err(e) => log::warn!("skipping malformed single dump: {}", e),
        }
    }

    blocks
}
