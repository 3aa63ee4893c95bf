//! Applies the parameter map to decoded blocks, including
//! modulation-slot allocation.

use anyhow::Result;
use serde_json::{json, Value};

use crate::handlers::HandlerRegistry;
use crate::params::{MapEntry, ParameterMap};
use crate::sysex::ParameterBlock;
use crate::vital::PresetDocument;

/// Capacity of the modulation-matrix slot pool.
pub const MOD_SLOT_COUNT: usize = 64;

/// Applies a validated [`ParameterMap`] to decoded parameter blocks.
///
/// Construction validates the table against the handler registry, so a
/// bad table aborts startup instead of surfacing somewhere mid-batch.
/// `apply` itself never fails on a well-formed block: per-parameter
/// anomalies are logged and skipped, because a partial preset is still
/// useful output.
pub struct MappingEngine<'a> {
    table: &'a ParameterMap,
    handlers: &'a HandlerRegistry,
    names: &'a [&'static str],
}

impl<'a> MappingEngine<'a> {
    /// Build an engine over a table, handler registry and index-to-name
    /// resource. Fails if the table references anything unregistered.
    pub fn new(
        table: &'a ParameterMap,
        handlers: &'a HandlerRegistry,
        names: &'a [&'static str],
    ) -> Result<Self> {
        table.validate(handlers)?;
        Ok(Self {
            table,
            handlers,
            names,
        })
    }

    /// Map every parameter byte of `block` into `doc`.
    ///
    /// Indices without a name and names without a table entry are
    /// skipped silently; reserved and deliberately unmapped parameters
    /// are the common case. A zero byte means "no change requested" and
    /// skips the entry, except for handlers, which may carry meaning at
    /// zero.
    pub fn apply(&self, block: &ParameterBlock, doc: &mut PresetDocument) {
        for (index, &byte) in block.bytes().iter().enumerate() {
            let Some(&name) = self.names.get(index) else {
                continue;
            };
            let Some(entry) = self.table.get(name) else {
                continue;
            };
            if byte == 0 && !matches!(entry, MapEntry::Handler { .. }) {
                continue;
            }

            match entry {
                MapEntry::Direct { target, scale } => match scale.apply(byte) {
                    Ok(value) => doc.set_setting(target, value.into()),
                    Err(e) => log::warn!("'{}': unscaleable byte {}: {}", name, byte, e),
                },
                MapEntry::FanOut { targets, split } => {
                    match split.apply(byte, targets.len()) {
                        Ok(values) => {
                            for (target, value) in targets.iter().zip(values) {
                                doc.set_setting(target, value.into());
                            }
                        }
                        Err(e) => log::warn!("'{}': fan-out failed for byte {}: {}", name, byte, e),
                    }
                }
                MapEntry::ModRoute {
                    source,
                    target,
                    scale,
                } => match scale.apply(byte) {
                    Ok(amount) if amount != 0.0 => allocate_route(doc, source, target, amount),
                    // Zero-amount modulation is equivalent to no
                    // modulation; the route never consumes a slot.
                    Ok(_) => {
                        log::warn!("'{}': zero-amount route {} -> {} dropped", name, source, target)
                    }
                    Err(e) => log::warn!("'{}': unscaleable byte {}: {}", name, byte, e),
                },
                MapEntry::Handler { name: handler } => {
                    // Guaranteed registered by validation at construction.
                    if let Some(run) = self.handlers.get(handler) {
                        run(byte, doc);
                    }
                }
            }
        }
    }
}

/// Claim the first empty modulation slot for a route and write its
/// side-car scalars. A full pool drops the route with a warning.
pub fn allocate_route(doc: &mut PresetDocument, source: &str, destination: &str, amount: f32) {
    let record = json!({
        "source": source,
        "destination": destination,
        "amount": amount,
    });

    let slots = doc.modulations_mut();
    let empty = slots.iter().position(is_empty_slot);

    let slot = match empty {
        Some(i) => {
            slots[i] = record;
            i
        }
        None if slots.len() < MOD_SLOT_COUNT => {
            slots.push(record);
            slots.len() - 1
        }
        None => {
            log::warn!(
                "no free modulation slot for {} -> {}, route dropped",
                source,
                destination
            );
            return;
        }
    };

    let number = slot + 1;
    doc.set_setting(&format!("modulation_{}_amount", number), amount.into());
    doc.set_setting(&format!("modulation_{}_bipolar", number), 0.0.into());
    doc.set_setting(&format!("modulation_{}_bypass", number), 0.0.into());
    doc.set_setting(&format!("modulation_{}_power", number), 0.0.into());
    doc.set_setting(&format!("modulation_{}_stereo", number), 0.0.into());
}

/// A slot is empty iff both its source and destination are empty strings.
fn is_empty_slot(slot: &Value) -> bool {
    let source = slot.get("source").and_then(Value::as_str).unwrap_or("");
    let destination = slot
        .get("destination")
        .and_then(Value::as_str)
        .unwrap_or("");
    source.is_empty() && destination.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{MapEntry, ParameterMap, Scale, Split, PARAM_NAMES};

    fn block_with(bytes: &[(usize, u8)]) -> ParameterBlock {
        let mut raw = [0u8; 256];
        for &(i, b) in bytes {
            raw[i] = b;
        }
        ParameterBlock::from_bytes(&raw).unwrap()
    }

    fn engine_parts() -> (ParameterMap, HandlerRegistry) {
        (ParameterMap::virus_default(), HandlerRegistry::builtin())
    }

    #[test]
    fn expression_maps_through_direct_scale() {
        let (table, handlers) = engine_parts();
        let engine = MappingEngine::new(&table, &handlers, &PARAM_NAMES).unwrap();
        let mut doc = PresetDocument::empty();

        // index 11 is Expression, mapped x/127
        engine.apply(&block_with(&[(11, 64)]), &mut doc);

        let value = doc
            .get_setting("macro_control_1")
            .unwrap()
            .as_f64()
            .unwrap();
        assert!((value - 64.0 / 127.0).abs() < 1e-4);
    }

    #[test]
    fn all_zero_block_adds_no_routes_and_touches_no_scaled_targets() {
        let (table, handlers) = engine_parts();
        let engine = MappingEngine::new(&table, &handlers, &PARAM_NAMES).unwrap();
        let mut doc = PresetDocument::empty();

        engine.apply(&block_with(&[]), &mut doc);

        // zero bytes are "no change requested" for every non-handler entry
        assert!(doc.get_setting("filter_1_cutoff").is_none());
        assert!(doc.get_setting("osc_1_level").is_none());
        assert!(doc
            .get_setting("modulations")
            .map_or(true, |m| m.as_array().unwrap().is_empty()));

        // handlers still ran: byte 0 filter balance is center
        assert_eq!(doc.get_setting("filter_1_mix").unwrap().as_f64(), Some(1.0));
        assert_eq!(doc.get_setting("filter_2_mix").unwrap().as_f64(), Some(1.0));
    }

    #[test]
    fn modulation_route_allocates_slot_and_side_cars() {
        let (table, handlers) = engine_parts();
        let engine = MappingEngine::new(&table, &handlers, &PARAM_NAMES).unwrap();
        let mut doc = PresetDocument::empty();

        // index 74: Osc1_Lfo1_Amount, bipolar, 96 -> +0.5
        engine.apply(&block_with(&[(74, 96)]), &mut doc);

        let slots = doc.get_setting("modulations").unwrap().as_array().unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0]["source"], "lfo_1");
        assert_eq!(slots[0]["destination"], "osc_1_transpose");
        assert!((slots[0]["amount"].as_f64().unwrap() - 0.5).abs() < 1e-6);

        assert!(doc.get_setting("modulation_1_amount").is_some());
        assert_eq!(
            doc.get_setting("modulation_1_bypass").unwrap().as_f64(),
            Some(0.0)
        );
    }

    #[test]
    fn centered_bipolar_route_is_dropped_without_a_slot() {
        let (table, handlers) = engine_parts();
        let engine = MappingEngine::new(&table, &handlers, &PARAM_NAMES).unwrap();
        let mut doc = PresetDocument::empty();

        // byte 64 scales to exactly 0.0 through the bipolar transform
        engine.apply(&block_with(&[(74, 64)]), &mut doc);

        let slots = doc.get_setting("modulations").unwrap().as_array().unwrap();
        assert!(slots.is_empty());
        assert!(doc.get_setting("modulation_1_amount").is_none());
    }

    #[test]
    fn routes_reuse_emptied_slots_first() {
        let (table, handlers) = engine_parts();
        let engine = MappingEngine::new(&table, &handlers, &PARAM_NAMES).unwrap();
        let mut doc = PresetDocument::empty();
        doc.modulations_mut().extend([
            json!({"source": "", "destination": "", "amount": 0.0}),
            json!({"source": "env_3", "destination": "volume", "amount": 0.2}),
        ]);

        engine.apply(&block_with(&[(74, 96)]), &mut doc);

        let slots = doc.get_setting("modulations").unwrap().as_array().unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0]["source"], "lfo_1");
        assert_eq!(slots[1]["source"], "env_3");
    }

    #[test]
    fn full_pool_drops_routes_instead_of_failing() {
        let (table, handlers) = engine_parts();
        let engine = MappingEngine::new(&table, &handlers, &PARAM_NAMES).unwrap();
        let mut doc = PresetDocument::empty();
        for i in 0..MOD_SLOT_COUNT {
            doc.modulations_mut().push(json!({
                "source": "lfo_2",
                "destination": format!("macro_control_{}", i),
                "amount": 0.1,
            }));
        }

        engine.apply(&block_with(&[(74, 96)]), &mut doc);

        let slots = doc.get_setting("modulations").unwrap().as_array().unwrap();
        assert_eq!(slots.len(), MOD_SLOT_COUNT);
        assert!(slots.iter().all(|s| s["source"] != "lfo_1"));
    }

    #[test]
    fn scale_failure_skips_only_that_entry() {
        let mut table = ParameterMap::new();
        table.insert(
            "Expression",
            MapEntry::FanOut {
                targets: vec!["macro_control_1", "macro_control_2"],
                split: Split::Duplicate(Scale::Recip { num: 1.0 }),
            },
        );
        table.insert(
            "Cutoff",
            MapEntry::Direct {
                target: "filter_1_cutoff",
                scale: Scale::Norm,
            },
        );
        let handlers = HandlerRegistry::builtin();
        let engine = MappingEngine::new(&table, &handlers, &PARAM_NAMES).unwrap();
        let mut doc = PresetDocument::empty();

        // Recip cannot fail at byte 0 here because zero bytes skip the
        // entry entirely; prove the rest of the block still maps when a
        // fan-out is present alongside a direct entry.
        engine.apply(&block_with(&[(11, 2), (40, 127)]), &mut doc);
        assert!(doc.get_setting("macro_control_1").is_some());
        assert_eq!(
            doc.get_setting("filter_1_cutoff").unwrap().as_f64(),
            Some(1.0)
        );
    }
}
