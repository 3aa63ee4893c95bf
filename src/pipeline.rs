//! Per-file conversion pipeline: extract, map, synthesize, serialize,
//! write.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::features::{self, DerivedStats, MidiData};
use crate::fxp;
use crate::mapping::{allocate_route, MappingEngine};
use crate::midi;
use crate::sysex::{self, ParameterBlock};
use crate::vital::{PresetDocument, NUM_KEYFRAMES, WAVE_FRAME_SIZE};
use crate::wavetable::{self, Shape};

/// Convert every Virus single dump embedded in one MIDI file into a
/// `.vital` patch file under `out_dir`, named `patch_{NNN}.vital` in
/// 1-based extraction order. Returns the written paths; a file with no
/// dumps yields an empty list.
pub fn convert_file(
    midi_path: &Path,
    template: &PresetDocument,
    engine: &MappingEngine,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let (events, data) = midi::read_file(midi_path)?;
    let blocks = sysex::extract_blocks(&events);
    if blocks.is_empty() {
        log::info!("no single dumps found in '{}'", midi_path.display());
        return Ok(Vec::new());
    }

    let stats = features::compute(&data);
    let frames = synthesize_frames(stats, &data);
    let fallback_name = file_stem(midi_path);

    let mut written = Vec::with_capacity(blocks.len());
    for (i, block) in blocks.iter().enumerate() {
        let number = i + 1;
        let mut doc = template.clone();
        engine.apply(block, &mut doc);

        let name = block
            .patch_name()
            .unwrap_or_else(|| format!("{} {}", fallback_name, number));
        doc.set_name(&name);

        let path = out_dir.join(format!("patch_{:03}.vital", number));
        let text = doc.serialize(Some(&frames));
        std::fs::write(&path, text)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        log::info!("wrote {} ({})", path.display(), name);
        written.push(path);
    }
    Ok(written)
}

/// Convert a plain MIDI performance (no sysex) into a single synthesized
/// patch: statistics drive the envelope, unison stacking, wavetable
/// frames and an LFO route.
pub fn convert_performance(
    midi_path: &Path,
    template: &PresetDocument,
    out_dir: &Path,
) -> Result<PathBuf> {
    let (_, data) = midi::read_file(midi_path)?;
    let stats = features::compute(&data);

    let mut doc = template.clone();
    apply_performance_heuristics(&mut doc, stats, &data);

    let name = file_stem(midi_path);
    doc.set_name(&name);

    let frames = synthesize_frames(stats, &data);
    let path = out_dir.join(format!("{}.vital", name));
    let text = doc.serialize(Some(&frames));
    std::fs::write(&path, text)
        .with_context(|| format!("failed to write '{}'", path.display()))?;
    log::info!("wrote {} ({})", path.display(), name);
    Ok(path)
}

/// Write the first single dump of a MIDI file as a Serum-layout `.fxp`.
pub fn convert_fxp(midi_path: &Path, out_path: &Path) -> Result<()> {
    let (events, _) = midi::read_file(midi_path)?;
    let blocks = sysex::extract_blocks(&events);
    let block = blocks
        .first()
        .ok_or_else(|| anyhow!("no single dumps found in '{}'", midi_path.display()))?;

    let name = block.patch_name().unwrap_or_else(|| file_stem(midi_path));
    let bytes = fxp::serialize(&fxp_params(block), &name);
    std::fs::write(out_path, bytes)
        .with_context(|| format!("failed to write '{}'", out_path.display()))?;
    log::info!("wrote {} ({})", out_path.display(), name);
    Ok(())
}

/// Normalized `Param {i}` map for the binary codec: one entry per dump
/// byte; the remaining target parameters keep their 0.0 default.
fn fxp_params(block: &ParameterBlock) -> HashMap<String, f32> {
    block
        .bytes()
        .iter()
        .enumerate()
        .map(|(i, &byte)| (format!("Param {}", i), byte as f32 / 127.0))
        .collect()
}

/// Three wavetable keyframes: a pure fundamental, the shape selected
/// from the performance, and a bright harmonic stack to morph into.
fn synthesize_frames(stats: DerivedStats, data: &MidiData) -> [String; NUM_KEYFRAMES] {
    let selected = features::select_shape(stats, data);
    [
        wavetable::generate(Shape::Sine, stats, WAVE_FRAME_SIZE),
        wavetable::generate(selected, stats, WAVE_FRAME_SIZE),
        wavetable::generate(Shape::HarmonicBuzz, stats, WAVE_FRAME_SIZE),
    ]
}

/// Performance-derived settings for files without any patch dump.
fn apply_performance_heuristics(doc: &mut PresetDocument, stats: DerivedStats, data: &MidiData) {
    let env = features::envelope_from_stats(stats);
    doc.set_setting("env_1_attack", env.attack.into());
    doc.set_setting("env_1_decay", env.decay.into());
    doc.set_setting("env_1_sustain", env.sustain.into());
    doc.set_setting("env_1_release", env.release.into());

    let voices = features::unison_voices(stats);
    doc.set_setting("osc_1_unison_voices", voices.into());
    doc.set_setting("osc_2_unison_voices", voices.into());

    if let Some(destination) = features::lfo_destination(data) {
        let depth = (data.control_changes.len() as f32 / 256.0).clamp(0.1, 0.5);
        allocate_route(doc, "lfo_1", destination, depth);
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "patch".to_string())
}
