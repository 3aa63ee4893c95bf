//! Vital preset document: template loading, nested access and the
//! wave-data patching serializer.

use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use flate2::read::GzDecoder;
use serde_json::{json, Map, Value};

/// An oscillator's wavetable always carries exactly this many keyframes.
pub const NUM_KEYFRAMES: usize = 3;

/// Frame positions used when padding a short keyframe list.
const KEYFRAME_POSITIONS: [f64; NUM_KEYFRAMES] = [0.0, 0.5, 1.0];

/// Samples per wavetable frame in the target format.
pub const WAVE_FRAME_SIZE: usize = 2048;

/// Top-level keys that older template generations carry outside of
/// `settings`; they are hoisted back in before encoding.
const LEGACY_SETTINGS_KEYS: &[&str] = &[
    "osc_1_level",
    "osc_1_pan",
    "osc_2_level",
    "osc_2_pan",
    "reverb_dry_wet",
    "chorus_dry_wet",
    "pitch_wheel",
];

/// The literal field pattern patched during serialization.
const WAVE_DATA_PATTERN: &str = "\"wave_data\":";

/// A Vital-style preset: a nested JSON document with a `settings` map
/// holding most synth parameters and a keyframes array holding the
/// wavetable payloads.
///
/// The wrapper keeps every field it does not understand untouched, which
/// the string-level wave_data patch in [`PresetDocument::serialize`]
/// relies on. Cloning is a deep copy; each conversion works on its own
/// clone of the loaded template.
#[derive(Debug, Clone)]
pub struct PresetDocument {
    root: Value,
}

impl PresetDocument {
    /// A minimal document with an empty `settings` map, for tests and
    /// handler units.
    pub fn empty() -> Self {
        Self {
            root: json!({ "settings": {} }),
        }
    }

    /// Wrap an already-parsed JSON tree.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// Read a template from disk. The file may be gzip-compressed JSON
    /// or plain JSON text.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read template '{}'", path.display()))?;
        Self::from_slice(&bytes)
            .with_context(|| format!("failed to decode template '{}'", path.display()))
    }

    /// Decode template bytes: attempt gzip decompression first, fall
    /// back to treating the bytes as plain UTF-8 JSON. Short keyframe
    /// lists are padded to exactly three entries.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let mut decompressed = Vec::new();
        let text = match GzDecoder::new(bytes).read_to_end(&mut decompressed) {
            Ok(_) => String::from_utf8(decompressed).context("decompressed template is not UTF-8")?,
            Err(_) => String::from_utf8(bytes.to_vec()).context("template is not UTF-8")?,
        };

        let root: Value = serde_json::from_str(&text).context("template is not valid JSON")?;
        if !root.is_object() {
            return Err(anyhow!("template root must be a JSON object"));
        }
        let mut doc = Self { root };
        doc.normalize_keyframes();
        Ok(doc)
    }

    /// Immutable access to the underlying tree.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The `settings` map, created on first use.
    fn settings_mut(&mut self) -> &mut Map<String, Value> {
        let root = self
            .root
            .as_object_mut()
            .expect("preset root is always an object");
        root.entry("settings")
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .expect("settings is always an object")
    }

    /// Assign one synth parameter under `settings`.
    pub fn set_setting(&mut self, key: &str, value: Value) {
        self.settings_mut().insert(key.to_string(), value);
    }

    /// Read one synth parameter from `settings`.
    pub fn get_setting(&self, key: &str) -> Option<&Value> {
        self.root.get("settings")?.get(key)
    }

    /// Generic dotted-path getter; numeric segments index arrays
    /// (`groups.0.components.0.keyframes`).
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut node = &self.root;
        for segment in path.split('.') {
            node = match node {
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => node.get(segment)?,
            };
        }
        Some(node)
    }

    /// Generic dotted-path setter. Missing intermediate objects are
    /// created; indexing past the end of an existing array is an error.
    pub fn set_path(&mut self, path: &str, value: Value) -> Result<()> {
        let mut node = &mut self.root;
        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| anyhow!("empty path"))?;

        for segment in parents {
            node = match node {
                Value::Array(items) => {
                    let idx: usize = segment
                        .parse()
                        .map_err(|_| anyhow!("'{}' is not an array index", segment))?;
                    items
                        .get_mut(idx)
                        .ok_or_else(|| anyhow!("index {} out of bounds in '{}'", idx, path))?
                }
                Value::Object(map) => map.entry(segment.to_string()).or_insert_with(|| json!({})),
                _ => return Err(anyhow!("'{}' is not traversable in '{}'", segment, path)),
            };
        }

        match node {
            Value::Array(items) => {
                let idx: usize = last
                    .parse()
                    .map_err(|_| anyhow!("'{}' is not an array index", last))?;
                let slot = items
                    .get_mut(idx)
                    .ok_or_else(|| anyhow!("index {} out of bounds in '{}'", idx, path))?;
                *slot = value;
            }
            Value::Object(map) => {
                map.insert(last.to_string(), value);
            }
            _ => return Err(anyhow!("'{}' is not assignable in '{}'", last, path)),
        }
        Ok(())
    }

    /// `settings.modulations` as a mutable list, created empty when the
    /// template has none.
    pub fn modulations_mut(&mut self) -> &mut Vec<Value> {
        self.settings_mut()
            .entry("modulations")
            .or_insert_with(|| json!([]))
            .as_array_mut()
            .expect("modulations is always an array")
    }

    /// Append a `{source, destination, amount}` record.
    pub fn push_modulation(&mut self, source: &str, destination: &str, amount: f32) {
        self.modulations_mut().push(json!({
            "source": source,
            "destination": destination,
            "amount": amount,
        }));
    }

    /// Force `groups.0.components.0.keyframes` to exactly three entries,
    /// padding with a silent default payload at positions 0, 0.5 and 1.
    /// Documents without a keyframes array are left alone.
    pub fn normalize_keyframes(&mut self) {
        let Some(frames) = self
            .root
            .get_mut("groups")
            .and_then(|g| g.get_mut(0))
            .and_then(|g| g.get_mut("components"))
            .and_then(|c| c.get_mut(0))
            .and_then(|c| c.get_mut("keyframes"))
            .and_then(Value::as_array_mut)
        else {
            return;
        };

        frames.truncate(NUM_KEYFRAMES);
        while frames.len() < NUM_KEYFRAMES {
            let position = KEYFRAME_POSITIONS[frames.len()];
            frames.push(json!({
                "position": position,
                "wave_data": default_wave_data(),
                "wave_source": { "type": "sample" },
            }));
        }
    }

    /// Rename up to `limit` string values equal to `needle` anywhere in
    /// the tree, in document order, returning how many were replaced.
    ///
    /// The walk is an explicit-stack depth-first traversal; templates
    /// nest deeply enough that recursion is not worth the risk.
    pub fn rename_first(&mut self, needle: &str, replacement: &str, limit: usize) -> usize {
        let mut replaced = 0;
        let mut stack: Vec<&mut Value> = vec![&mut self.root];

        while let Some(node) = stack.pop() {
            if replaced >= limit {
                break;
            }
            match node {
                Value::String(s) => {
                    if s == needle {
                        *s = replacement.to_string();
                        replaced += 1;
                    }
                }
                // Push children reversed so document order pops first.
                Value::Array(items) => stack.extend(items.iter_mut().rev()),
                Value::Object(map) => stack.extend(map.values_mut().rev()),
                _ => {}
            }
        }
        replaced
    }

    /// Name the output patch: sets `preset_name` and renames the first
    /// two `"Init"` sentinels the stock template carries.
    pub fn set_name(&mut self, name: &str) {
        self.rename_first("Init", name, 2);
        if let Some(root) = self.root.as_object_mut() {
            root.insert("preset_name".to_string(), json!(name));
        }
    }

    /// Encode the document to JSON text, optionally patching the first
    /// three `"wave_data"` payloads with the supplied frames.
    ///
    /// The patch is a string-level substitution on the encoded text, not
    /// a structural rewrite, so every field the mapping engine never
    /// touched keeps its encoded form. Finding fewer than three payload
    /// fields replaces what exists and logs a warning.
    pub fn serialize(&self, wave_frames: Option<&[String; NUM_KEYFRAMES]>) -> String {
        let mut doc = self.clone();
        doc.hoist_legacy_keys();
        doc.modulations_mut();
        doc.normalize_keyframes();

        let mut text = doc.root.to_string();
        if let Some(frames) = wave_frames {
            text = patch_wave_data(&text, frames);
        }
        text
    }

    /// Move stray legacy keys from the top level into `settings`.
    fn hoist_legacy_keys(&mut self) {
        let Some(root) = self.root.as_object_mut() else {
            return;
        };
        let mut hoisted = Vec::new();
        for &key in LEGACY_SETTINGS_KEYS {
            if let Some(value) = root.remove(key) {
                hoisted.push((key, value));
            }
        }
        for (key, value) in hoisted {
            self.set_setting(key, value);
        }
    }
}

/// Base64 payload of one silent frame, used to pad short keyframe lists.
pub fn default_wave_data() -> String {
    B64.encode(vec![0u8; WAVE_FRAME_SIZE * 4])
}

/// Replace the payload of the first three `"wave_data": "..."` fields in
/// encoded JSON text, in order of appearance.
fn patch_wave_data(text: &str, frames: &[String; NUM_KEYFRAMES]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut patched = 0;

    while patched < frames.len() {
        // Encoded base64 payloads contain no quotes or escapes, so the
        // payload ends at the next double quote.
        let Some(at) = rest.find(WAVE_DATA_PATTERN) else {
            break;
        };
        let after_key = at + WAVE_DATA_PATTERN.len();
        let tail = &rest[after_key..];
        let Some(open) = tail.find('"') else {
            break;
        };
        let payload_start = after_key + open + 1;
        let Some(len) = rest[payload_start..].find('"') else {
            break;
        };

        out.push_str(&rest[..payload_start]);
        out.push_str(&frames[patched]);
        rest = &rest[payload_start + len..];
        patched += 1;
    }
    out.push_str(rest);

    if patched < frames.len() {
        log::warn!(
            "template has only {} wave_data field(s), expected {}",
            patched,
            frames.len()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_with_keyframes(n: usize) -> PresetDocument {
        let frames: Vec<Value> = (0..n)
            .map(|i| {
                json!({
                    "position": i as f64,
                    "wave_data": format!("ZnJhbWV7fQ{}", i),
                    "wave_source": { "type": "sample" },
                })
            })
            .collect();
        PresetDocument::from_value(json!({
            "preset_name": "Init",
            "settings": {},
            "groups": [ { "components": [ { "keyframes": frames } ] } ],
        }))
    }

    #[test]
    fn keyframes_are_forced_to_exactly_three() {
        for start_len in [0, 1, 2, 3, 5] {
            let mut doc = template_with_keyframes(start_len);
            doc.normalize_keyframes();
            let frames = doc.get_path("groups.0.components.0.keyframes").unwrap();
            assert_eq!(frames.as_array().unwrap().len(), 3, "start {}", start_len);
        }
    }

    #[test]
    fn gz_and_plain_templates_both_load() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let text = br#"{"settings":{"volume":1.0}}"#;
        let plain = PresetDocument::from_slice(text).unwrap();
        assert_eq!(plain.get_setting("volume").unwrap().as_f64(), Some(1.0));

        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(text).unwrap();
        let gz = enc.finish().unwrap();
        let compressed = PresetDocument::from_slice(&gz).unwrap();
        assert_eq!(
            compressed.get_setting("volume").unwrap().as_f64(),
            Some(1.0)
        );
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        assert!(PresetDocument::from_slice(b"not json at all").is_err());
    }

    #[test]
    fn non_object_template_roots_are_a_decode_error() {
        // valid JSON, but no settings map can ever live here
        assert!(PresetDocument::from_slice(b"[1,2,3]").is_err());
        assert!(PresetDocument::from_slice(b"\"just a string\"").is_err());
        assert!(PresetDocument::from_slice(b"42").is_err());
    }

    #[test]
    fn path_accessors_traverse_arrays_and_objects() {
        let mut doc = template_with_keyframes(3);
        assert_eq!(
            doc.get_path("groups.0.components.0.keyframes.1.position")
                .unwrap()
                .as_f64(),
            Some(1.0)
        );
        doc.set_path("groups.0.components.0.name", json!("Osc 1"))
            .unwrap();
        assert_eq!(
            doc.get_path("groups.0.components.0.name").unwrap(),
            &json!("Osc 1")
        );
        assert!(doc.set_path("groups.9.name", json!("x")).is_err());
    }

    #[test]
    fn serialize_defaults_modulations_to_empty_list() {
        let doc = PresetDocument::from_slice(br#"{"settings":{}}"#).unwrap();
        let text = doc.serialize(None);
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["settings"]["modulations"], json!([]));
    }

    #[test]
    fn serialize_hoists_legacy_top_level_keys() {
        let doc =
            PresetDocument::from_slice(br#"{"chorus_dry_wet":0.25,"settings":{}}"#).unwrap();
        let parsed: Value = serde_json::from_str(&doc.serialize(None)).unwrap();
        assert!(parsed.get("chorus_dry_wet").is_none());
        assert_eq!(parsed["settings"]["chorus_dry_wet"], json!(0.25));
    }

    #[test]
    fn wave_data_patch_replaces_first_three_in_order() {
        let doc = template_with_keyframes(3);
        let frames = [
            "QUFB".to_string(),
            "QkJC".to_string(),
            "Q0ND".to_string(),
        ];
        let text = doc.serialize(Some(&frames));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        let keyframes = parsed["groups"][0]["components"][0]["keyframes"]
            .as_array()
            .unwrap();
        assert_eq!(keyframes[0]["wave_data"], json!("QUFB"));
        assert_eq!(keyframes[1]["wave_data"], json!("QkJC"));
        assert_eq!(keyframes[2]["wave_data"], json!("Q0ND"));
    }

    #[test]
    fn missing_wave_data_fields_do_not_abort_serialization() {
        // one keyframe before normalization would be padded to three, so
        // build a document with a single wave_data field elsewhere
        let doc = PresetDocument::from_value(json!({
            "settings": {},
            "lfos": [ { "wave_data": "b2xk" } ],
        }));
        let frames = [
            "QUFB".to_string(),
            "QkJC".to_string(),
            "Q0ND".to_string(),
        ];
        let text = doc.serialize(Some(&frames));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["lfos"][0]["wave_data"], json!("QUFB"));
    }

    #[test]
    fn rename_is_bounded_and_in_document_order() {
        let mut doc = PresetDocument::from_value(json!({
            "a": "Init",
            "b": { "c": ["Init", "Init"] },
            "d": "Init",
        }));
        let replaced = doc.rename_first("Init", "Lead 1", 2);
        assert_eq!(replaced, 2);
        assert_eq!(doc.root()["a"], json!("Lead 1"));
        assert_eq!(doc.root()["b"]["c"][0], json!("Lead 1"));
        assert_eq!(doc.root()["b"]["c"][1], json!("Init"));
        assert_eq!(doc.root()["d"], json!("Init"));
    }

    #[test]
    fn untouched_fields_survive_a_load_serialize_round_trip() {
        let doc = PresetDocument::from_slice(
            br#"{"settings":{"volume":0.5,"modulations":[],"custom_engine_field":{"deep":[1,2,3]}}}"#,
        )
        .unwrap();
        let parsed: Value = serde_json::from_str(&doc.serialize(None)).unwrap();
        assert_eq!(parsed["settings"]["volume"], json!(0.5));
        assert_eq!(parsed["settings"]["modulations"], json!([]));
        assert_eq!(
            parsed["settings"]["custom_engine_field"]["deep"],
            json!([1, 2, 3])
        );
    }
}
