//! Convert Access Virus patch dumps and MIDI performances into software
//! synthesizer presets.
//!
//! The crate decodes Virus "Single Dump" sysex blocks embedded in MIDI
//! files, pushes each parameter byte through a declarative mapping table
//! into a Vital-style JSON preset, synthesizes wavetable frames from the
//! performance itself, and can also pack a Serum-layout binary preset.

#![warn(missing_docs)]

pub mod features;
pub mod fxp;
pub mod handlers;
pub mod mapping;
pub mod midi;
pub mod params;
pub mod pipeline;
pub mod sysex;
pub mod vital;
pub mod wavetable;

pub use handlers::HandlerRegistry;
pub use mapping::MappingEngine;
pub use params::{ParameterMap, PARAM_NAMES};
pub use sysex::ParameterBlock;
pub use vital::PresetDocument;
