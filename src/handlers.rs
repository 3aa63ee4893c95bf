//! Named handler overrides for parameters that need conditional
//! multi-field writes.

use std::collections::HashMap;

use crate::vital::PresetDocument;

/// A named side-effecting override for parameters whose mapping cannot be
/// expressed as scale-and-assign. Handlers receive the raw byte and the
/// whole document, and unlike table entries they also run for byte 0.
pub type HandlerFn = fn(u8, &mut PresetDocument);

/// Registry of handler implementations, looked up by the names the
/// mapping table uses. Populated once at startup and validated against
/// the table before any block is mapped.
pub struct HandlerRegistry {
    handlers: HashMap<&'static str, HandlerFn>,
}

impl HandlerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry preloaded with all stock handlers.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        reg.register("set_filter_balance_mix", set_filter_balance_mix);
        reg.register("set_filter_routing", set_filter_routing);
        reg.register("enable_noise", enable_noise);
        reg.register("set_unison_voices", set_unison_voices);
        reg
    }

    /// Add a handler under a stable name.
    pub fn register(&mut self, name: &'static str, handler: HandlerFn) {
        self.handlers.insert(name, handler);
    }

    /// True if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Look up a handler by name.
    pub fn get(&self, name: &str) -> Option<HandlerFn> {
        self.handlers.get(name).copied()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Virus filter balance: byte 64 is center, 0 means "not stored" and is
/// also treated as center. Each side keeps full mix until the pot moves
/// away from it: `balance = (value - 64) / 64`, both mixes clamped to 1.0.
fn set_filter_balance_mix(value: u8, doc: &mut PresetDocument) {
    let value = if value == 0 { 64 } else { value };
    let balance = (value as f32 - 64.0) / 64.0;
    let mix_1 = (1.0 - balance).clamp(0.0, 1.0);
    let mix_2 = (1.0 + balance).clamp(0.0, 1.0);
    doc.set_setting("filter_1_mix", mix_1.into());
    doc.set_setting("filter_2_mix", mix_2.into());
}

/// Virus filter routing. Serial modes feed filter 1 into filter 2;
/// parallel and split modes run them side by side. Routing also decides
/// whether filter 2 is active at all.
fn set_filter_routing(value: u8, doc: &mut PresetDocument) {
    match value {
        // Ser4 / Ser6: chain, both filters on
        0 | 1 => {
            doc.set_setting("filter_1_on", 1.0.into());
            doc.set_setting("filter_2_on", 1.0.into());
            doc.set_setting("filter_2_filter_input", 1.0.into());
        }
        // Par4: both on, independent inputs
        2 => {
            doc.set_setting("filter_1_on", 1.0.into());
            doc.set_setting("filter_2_on", 1.0.into());
            doc.set_setting("filter_2_filter_input", 0.0.into());
        }
        // Split and anything newer: filter 1 only
        _ => {
            doc.set_setting("filter_1_on", 1.0.into());
            doc.set_setting("filter_2_on", 0.0.into());
            doc.set_setting("filter_2_filter_input", 0.0.into());
        }
    }
}

/// Noise volume enables the sample source (Vital's noise generator) only
/// when it is actually audible.
fn enable_noise(value: u8, doc: &mut PresetDocument) {
    if value == 0 {
        doc.set_setting("sample_on", 0.0.into());
        return;
    }
    doc.set_setting("sample_on", 1.0.into());
    doc.set_setting("sample_level", (value as f32 / 127.0).into());
}

/// Virus unison mode is an off/twin/3..8-voice selector, not a raw count.
fn set_unison_voices(value: u8, doc: &mut PresetDocument) {
    let voices = match value {
        0 => 1.0,
        1 => 2.0,
        n => (n + 1).min(8) as f32,
    };
    doc.set_setting("osc_1_unison_voices", voices.into());
    doc.set_setting("osc_2_unison_voices", voices.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vital::PresetDocument;

    #[test]
    fn filter_balance_center_keeps_both_filters_full() {
        let mut doc = PresetDocument::empty();
        let handler = HandlerRegistry::builtin()
            .get("set_filter_balance_mix")
            .unwrap();

        // byte 0 is treated as center, not as hard-left
        handler(0, &mut doc);
        assert_eq!(doc.get_setting("filter_1_mix").unwrap().as_f64(), Some(1.0));
        assert_eq!(doc.get_setting("filter_2_mix").unwrap().as_f64(), Some(1.0));
    }

    #[test]
    fn filter_balance_hard_right_mutes_filter_one() {
        let mut doc = PresetDocument::empty();
        set_filter_balance_mix(127, &mut doc);
        let mix_1 = doc.get_setting("filter_1_mix").unwrap().as_f64().unwrap();
        let mix_2 = doc.get_setting("filter_2_mix").unwrap().as_f64().unwrap();
        assert!(mix_1 < 0.05);
        assert_eq!(mix_2, 1.0);
    }

    #[test]
    fn noise_handler_is_meaningful_at_zero() {
        let mut doc = PresetDocument::empty();
        enable_noise(0, &mut doc);
        assert_eq!(doc.get_setting("sample_on").unwrap().as_f64(), Some(0.0));
        assert!(doc.get_setting("sample_level").is_none());

        enable_noise(127, &mut doc);
        assert_eq!(doc.get_setting("sample_on").unwrap().as_f64(), Some(1.0));
    }

    #[test]
    fn unison_selector_maps_to_voice_counts() {
        let mut doc = PresetDocument::empty();
        set_unison_voices(0, &mut doc);
        assert_eq!(
            doc.get_setting("osc_1_unison_voices").unwrap().as_f64(),
            Some(1.0)
        );
        set_unison_voices(7, &mut doc);
        assert_eq!(
            doc.get_setting("osc_2_unison_voices").unwrap().as_f64(),
            Some(8.0)
        );
    }
}
