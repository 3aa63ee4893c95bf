//! Serum-layout binary preset codec.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use anyhow::{anyhow, Context, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// Chunk magic for the preset container.
pub const FXP_MAGIC: &[u8; 4] = b"CcnK";
/// Format tag for a parameter-chunk preset.
pub const FXP_FORMAT: &[u8; 4] = b"FPCh";
/// Target plugin id.
pub const PLUGIN_ID: &[u8; 4] = b"XfsX";
/// Container version.
pub const FXP_VERSION: u32 = 1;
/// Preset type tag for a single preset.
const PRESET_TYPE_SINGLE: u32 = 1;
/// Fixed width of the embedded preset name.
const NAME_LEN: usize = 28;
/// Fixed parameter count of the target layout.
pub const NUM_PARAMS: usize = 288;

/// Pack a parameter map into the fixed binary layout: header, 28-byte
/// space-padded name, then 288 big-endian floats taken from the
/// `Param {i}` keys, defaulting to 0.0 where a key is absent.
///
/// The contract is structural correctness of this layout, not
/// loader-level interoperability; the true upstream format is
/// undocumented.
pub fn serialize(params: &HashMap<String, f32>, preset_name: &str) -> Vec<u8> {
    // everything after the magic and size fields
    let payload_size = (4 + 4 + 4 + 4 + NAME_LEN + 4 + NUM_PARAMS * 4) as u32;

    let mut out = Vec::with_capacity(8 + payload_size as usize);
    out.extend_from_slice(FXP_MAGIC);
    out.write_u32::<BigEndian>(payload_size)
        .expect("writing to a vec cannot fail");
    out.extend_from_slice(FXP_FORMAT);
    out.write_u32::<BigEndian>(FXP_VERSION).unwrap();
    out.extend_from_slice(PLUGIN_ID);
    out.write_u32::<BigEndian>(PRESET_TYPE_SINGLE).unwrap();

    let mut name = [b' '; NAME_LEN];
    for (dst, src) in name.iter_mut().zip(preset_name.bytes()) {
        *dst = if src.is_ascii() && src >= 0x20 { src } else { b'_' };
    }
    out.extend_from_slice(&name);

    out.write_u32::<BigEndian>(NUM_PARAMS as u32).unwrap();
    for i in 0..NUM_PARAMS {
        let value = params.get(&format!("Param {}", i)).copied().unwrap_or(0.0);
        out.write_f32::<BigEndian>(value).unwrap();
    }
    out
}

/// A decoded preset of the same fixed layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FxpPreset {
    /// Embedded preset name, padding stripped.
    pub name: String,
    /// Flat parameter array in index order.
    pub params: Vec<f32>,
}

/// Decode bytes produced by [`serialize`]. Rejects unknown magic,
/// format tags or plugin ids.
pub fn deserialize(bytes: &[u8]) -> Result<FxpPreset> {
    let mut cursor = Cursor::new(bytes);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic).context("truncated header")?;
    if &magic != FXP_MAGIC {
        return Err(anyhow!("bad chunk magic {:?}", magic));
    }

    let declared_size = cursor.read_u32::<BigEndian>().context("truncated header")?;
    let remaining = bytes.len().saturating_sub(8);
    if declared_size as usize != remaining {
        return Err(anyhow!(
            "declared size {} does not match payload size {}",
            declared_size,
            remaining
        ));
    }

    let mut format = [0u8; 4];
    cursor.read_exact(&mut format).context("truncated header")?;
    if &format != FXP_FORMAT {
        return Err(anyhow!("unsupported format tag {:?}", format));
    }

    let version = cursor.read_u32::<BigEndian>().context("truncated header")?;
    if version != FXP_VERSION {
        return Err(anyhow!("unsupported version {}", version));
    }

    let mut plugin = [0u8; 4];
    cursor.read_exact(&mut plugin).context("truncated header")?;
    if &plugin != PLUGIN_ID {
        return Err(anyhow!("preset targets a different plugin: {:?}", plugin));
    }

    let _preset_type = cursor.read_u32::<BigEndian>().context("truncated header")?;

    let mut name_bytes = [0u8; NAME_LEN];
    cursor.read_exact(&mut name_bytes).context("truncated name")?;
    let name = String::from_utf8_lossy(&name_bytes)
        .trim_end_matches(|c| c == '\0' || c == ' ')
        .to_string();

    let count = cursor.read_u32::<BigEndian>().context("truncated count")? as usize;
    // the count field is untrusted; bound it by the bytes actually present
    let available = bytes.len().saturating_sub(cursor.position() as usize) / 4;
    if count > available {
        return Err(anyhow!(
            "declared parameter count {} exceeds the {} present in the payload",
            count,
            available
        ));
    }
    let mut params = Vec::with_capacity(count);
    for _ in 0..count {
        params.push(
            cursor
                .read_f32::<BigEndian>()
                .context("truncated parameter array")?,
        );
    }

    Ok(FxpPreset { name, params })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_named_params_and_defaults_the_rest() {
        let mut params = HashMap::new();
        params.insert("Param 0".to_string(), 0.25f32);
        params.insert("Param 17".to_string(), -1.5f32);
        params.insert("Param 287".to_string(), 0.875f32);
        params.insert("Not A Param".to_string(), 9.0f32);

        let bytes = serialize(&params, "Virus Lead");
        let preset = deserialize(&bytes).unwrap();

        assert_eq!(preset.name, "Virus Lead");
        assert_eq!(preset.params.len(), NUM_PARAMS);
        assert_eq!(preset.params[0], 0.25);
        assert_eq!(preset.params[17], -1.5);
        assert_eq!(preset.params[287], 0.875);
        assert_eq!(preset.params[1], 0.0);
    }

    #[test]
    fn header_layout_is_fixed() {
        let bytes = serialize(&HashMap::new(), "X");
        assert_eq!(&bytes[0..4], b"CcnK");
        assert_eq!(&bytes[8..12], b"FPCh");
        assert_eq!(&bytes[16..20], b"XfsX");
        // 8-byte outer header + 16 bytes of tags + 28-byte name + count
        assert_eq!(bytes.len(), 8 + 16 + 28 + 4 + NUM_PARAMS * 4);
    }

    #[test]
    fn long_and_non_ascii_names_are_clamped() {
        let bytes = serialize(
            &HashMap::new(),
            "an absurdly long preset name that cannot fit ünïcödé",
        );
        let preset = deserialize(&bytes).unwrap();
        assert!(preset.name.len() <= NAME_LEN);
        assert!(preset.name.is_ascii());
    }

    #[test]
    fn corrupt_headers_are_rejected() {
        let good = serialize(&HashMap::new(), "ok");

        let mut bad_magic = good.clone();
        bad_magic[0] = b'X';
        assert!(deserialize(&bad_magic).is_err());

        let mut bad_plugin = good.clone();
        bad_plugin[16] = b'?';
        assert!(deserialize(&bad_plugin).is_err());

        assert!(deserialize(&good[..40]).is_err());
    }

    #[test]
    fn oversized_parameter_counts_are_rejected_before_allocation() {
        let mut bytes = serialize(&HashMap::new(), "ok");
        // count field sits after the 8-byte outer header, 16 bytes of
        // tags and the 28-byte name
        bytes[52..56].copy_from_slice(&u32::MAX.to_be_bytes());
        let err = deserialize(&bytes).unwrap_err();
        assert!(err.to_string().contains("parameter count"));
    }
}
