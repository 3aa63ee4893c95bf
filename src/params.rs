//! Static mapping resources: the index-to-name table and the
//! declarative parameter-map rules with their closed scale-function set.

use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::handlers::HandlerRegistry;

/// Canonical parameter name for every Virus single-dump index.
///
/// The `undefined_N` placeholders are stable keys that other configuration
/// refers to by name; they must be preserved verbatim.
pub static PARAM_NAMES: [&str; 256] = [
    "undefined_0", // 0
    "undefined_1", // 1
    "undefined_2", // 2
    "undefined_3", // 3
    "undefined_4", // 4
    "Portamento_Time", // 5
    "undefined_6", // 6
    "undefined_7", // 7
    "undefined_8", // 8
    "undefined_9", // 9
    "Panorama", // 10
    "Expression", // 11
    "undefined_12", // 12
    "undefined_13", // 13
    "undefined_14", // 14
    "undefined_15", // 15
    "undefined_16", // 16
    "Osc1_Shape", // 17
    "Osc1_Pulsewidth", // 18
    "Osc1_Wave_Select", // 19
    "Osc1_Semitone", // 20
    "Osc1_Keyfollow", // 21
    "Osc2_Shape", // 22
    "Osc2_Pulsewidth", // 23
    "Osc2_Wave_Select", // 24
    "Osc2_Semitone", // 25
    "Osc2_Detune", // 26
    "Osc2_FM_Amount", // 27
    "Osc2_Sync", // 28
    "Osc2_Filt_Env_Amt", // 29
    "FM_Filt_Env_Amt", // 30
    "Osc2_Keyfollow", // 31
    "undefined_32", // 32
    "Osc_Balance", // 33
    "Suboscillator_Volume", // 34
    "Suboscillator_Shape", // 35
    "Osc_Mainvolume", // 36
    "Noise_Volume", // 37
    "Ringmodulator_Volume", // 38
    "Noise_Color", // 39
    "Cutoff", // 40
    "Cutoff2", // 41
    "Filter1_Resonance", // 42
    "Filter2_Resonance", // 43
    "Filter1_Env_Amt", // 44
    "Filter2_Env_Amt", // 45
    "Filter1_Keyfollow", // 46
    "Filter2_Keyfollow", // 47
    "Filter_Balance", // 48
    "Saturation_Curve", // 49
    "undefined_50", // 50
    "Filter1_Mode", // 51
    "Filter2_Mode", // 52
    "Filter_Routing", // 53
    "Filter_Env_Attack", // 54
    "Filter_Env_Decay", // 55
    "Filter_Env_Sustain", // 56
    "Filter_Env_Sustain_Time", // 57
    "Filter_Env_Release", // 58
    "Amp_Env_Attack", // 59
    "Amp_Env_Decay", // 60
    "Amp_Env_Sustain", // 61
    "Amp_Env_Sustain_Time", // 62
    "Amp_Env_Release", // 63
    "Hold_Pedal", // 64
    "undefined_65", // 65
    "undefined_66", // 66
    "Lfo1_Rate", // 67
    "Lfo1_Shape", // 68
    "Lfo1_Env_Mode", // 69
    "Lfo1_Mode", // 70
    "Lfo1_Symmetry", // 71
    "Lfo1_Keyfollow", // 72
    "Lfo1_Keytrigger", // 73
    "Osc1_Lfo1_Amount", // 74
    "Osc2_Lfo1_Amount", // 75
    "PW_Lfo1_Amount", // 76
    "Reso_Lfo1_Amount", // 77
    "FiltGain_Lfo1_Amount", // 78
    "Lfo2_Rate", // 79
    "Lfo2_Shape", // 80
    "Lfo2_Env_Mode", // 81
    "Lfo2_Mode", // 82
    "Lfo2_Symmetry", // 83
    "Lfo2_Keyfollow", // 84
    "Lfo2_Keytrigger", // 85
    "OscShape_Lfo2_Amount", // 86
    "FmAmount_Lfo2_Amount", // 87
    "Cutoff1_Lfo2_Amount", // 88
    "Cutoff2_Lfo2_Amount", // 89
    "Panorama_Lfo2_Amount", // 90
    "Patch_Volume", // 91
    "undefined_92", // 92
    "Transpose", // 93
    "Key_Mode", // 94
    "undefined_95", // 95
    "undefined_96", // 96
    "Unison_Mode", // 97
    "Unison_Detune", // 98
    "Unison_Panorama_Spread", // 99
    "Unison_Lfo_Phase", // 100
    "Input_Mode", // 101
    "Input_Select", // 102
    "undefined_103", // 103
    "undefined_104", // 104
    "Chorus_Mix", // 105
    "Chorus_Rate", // 106
    "Chorus_Depth", // 107
    "Chorus_Delay", // 108
    "Chorus_Feedback", // 109
    "Chorus_Lfo_Shape", // 110
    "undefined_111", // 111
    "Effect_Send", // 112
    "Delay_Time", // 113
    "Delay_Feedback", // 114
    "Delay_Rate", // 115
    "Delay_Depth", // 116
    "Delay_Lfo_Shape", // 117
    "undefined_118", // 118
    "undefined_119", // 119
    "undefined_120", // 120
    "undefined_121", // 121
    "Keyb_Local", // 122
    "undefined_123", // 123
    "undefined_124", // 124
    "undefined_125", // 125
    "undefined_126", // 126
    "undefined_127", // 127
    "undefined_128", // 128
    "Arp_Mode", // 129
    "Arp_Pattern_Select", // 130
    "undefined_131", // 131
    "Arp_Range", // 132
    "Arp_Hold_Enable", // 133
    "Arp_Note_Length", // 134
    "Arp_Swing", // 135
    "Lfo3_Rate", // 136
    "Lfo3_Shape", // 137
    "Lfo3_Mode", // 138
    "Lfo3_Keyfollow", // 139
    "Lfo3_Destination", // 140
    "Osc_Lfo3_Amount", // 141
    "Lfo3_Fade_In_Time", // 142
    "undefined_143", // 143
    "undefined_144", // 144
    "Clock_Tempo", // 145
    "Arp_Clock", // 146
    "Lfo1_Clock", // 147
    "Lfo2_Clock", // 148
    "Delay_Clock", // 149
    "Lfo3_Clock", // 150
    "undefined_151", // 151
    "undefined_152", // 152
    "Control_Smooth_Mode", // 153
    "Bender_Range_Up", // 154
    "Bender_Range_Down", // 155
    "Bender_Scale", // 156
    "undefined_157", // 157
    "Filter1_Env_Polarity", // 158
    "Filter2_Env_Polarity", // 159
    "Filter2_Cutoff_Link", // 160
    "Filter_Keytrack_Base", // 161
    "Osc_FM_Mode", // 162
    "Osc_Init_Phase", // 163
    "Punch_Intensity", // 164
    "undefined_165", // 165
    "undefined_166", // 166
    "Vocoder_Mode", // 167
    "Osc3_Mode", // 168
    "Osc3_Volume", // 169
    "Osc3_Semitone", // 170
    "Osc3_Detune", // 171
    "undefined_172", // 172
    "undefined_173", // 173
    "Osc1_Shape_Velocity", // 174
    "Osc2_Shape_Velocity", // 175
    "PulseWidth_Velocity", // 176
    "Fm_Amount_Velocity", // 177
    "undefined_178", // 178
    "undefined_179", // 179
    "Filter1_EnvAmt_Velocity", // 180
    "Filter2_EnvAmt_Velocity", // 181
    "Resonance1_Velocity", // 182
    "Resonance2_Velocity", // 183
    "undefined_184", // 184
    "undefined_185", // 185
    "Amp_Velocity", // 186
    "Panorama_Velocity", // 187
    "undefined_188", // 188
    "undefined_189", // 189
    "undefined_190", // 190
    "undefined_191", // 191
    "Definable1_Single", // 192
    "Definable2_Single", // 193
    "Assign1_Source", // 194
    "Assign1_Destination", // 195
    "Assign1_Amount", // 196
    "Assign2_Source", // 197
    "Assign2_Destination1", // 198
    "Assign2_Amount1", // 199
    "Assign2_Destination2", // 200
    "Assign2_Amount2", // 201
    "Assign3_Source", // 202
    "Assign3_Destination1", // 203
    "Assign3_Amount1", // 204
    "Assign3_Destination2", // 205
    "Assign3_Amount2", // 206
    "Assign3_Destination3", // 207
    "Assign3_Amount3", // 208
    "undefined_209", // 209
    "undefined_210", // 210
    "undefined_211", // 211
    "undefined_212", // 212
    "undefined_213", // 213
    "undefined_214", // 214
    "Phaser_Mode", // 215
    "Phaser_Mix", // 216
    "Phaser_Rate", // 217
    "Phaser_Depth", // 218
    "Phaser_Frequency", // 219
    "Phaser_Feedback", // 220
    "Phaser_Spread", // 221
    "undefined_222", // 222
    "undefined_223", // 223
    "undefined_224", // 224
    "Ringmodulator_Mix", // 225
    "Distortion_Curve", // 226
    "Distortion_Intensity", // 227
    "undefined_228", // 228
    "undefined_229", // 229
    "undefined_230", // 230
    "undefined_231", // 231
    "undefined_232", // 232
    "undefined_233", // 233
    "undefined_234", // 234
    "undefined_235", // 235
    "undefined_236", // 236
    "undefined_237", // 237
    "undefined_238", // 238
    "undefined_239", // 239
    "Single_Name_Char1", // 240
    "Single_Name_Char2", // 241
    "Single_Name_Char3", // 242
    "Single_Name_Char4", // 243
    "Single_Name_Char5", // 244
    "Single_Name_Char6", // 245
    "Single_Name_Char7", // 246
    "Single_Name_Char8", // 247
    "Single_Name_Char9", // 248
    "Single_Name_Char10", // 249
    "undefined_250", // 250
    "undefined_251", // 251
    "undefined_252", // 252
    "undefined_253", // 253
    "undefined_254", // 254
    "undefined_255", // 255
];

/// Pure numeric transform from a raw parameter byte to a target value.
///
/// Only a handful of distinct transform shapes occur across the whole
/// mapping table, so this is a closed set of named variants instead of
/// arbitrary closures; the table stays plain data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// `x / 127`
    Norm,
    /// `(x - 64) / 64`, center detented at 64
    Bipolar,
    /// `lo + (x / 127) * (hi - lo)`
    Range { lo: f32, hi: f32 },
    /// `num / x`; degenerate at `x == 0`
    Recip { num: f32 },
    /// `x` as-is
    Raw,
}

impl Scale {
    /// Transform one raw byte. `Recip` fails on a zero byte; everything
    /// else is total.
    pub fn apply(&self, byte: u8) -> Result<f32> {
        let x = byte as f32;
        match *self {
            Scale::Norm => Ok(x / 127.0),
            Scale::Bipolar => Ok((x - 64.0) / 64.0),
            Scale::Range { lo, hi } => Ok(lo + (x / 127.0) * (hi - lo)),
            Scale::Recip { num } => {
                if byte == 0 {
                    Err(anyhow!("reciprocal scale undefined for byte 0"))
                } else {
                    Ok(num / x)
                }
            }
            Scale::Raw => Ok(x),
        }
    }
}

/// Fan-out shape: how one byte becomes one value per target path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Split {
    /// Balance pot across exactly two targets: center 64 leaves both at
    /// full level, turning either way attenuates the far side.
    Balance,
    /// The same scaled value for every target.
    Duplicate(Scale),
}

impl Split {
    /// Produce one value per target. Fails if the split shape does not
    /// fit the target count or the inner scale fails.
    pub fn apply(&self, byte: u8, n_targets: usize) -> Result<Vec<f32>> {
        match *self {
            Split::Balance => {
                if n_targets != 2 {
                    return Err(anyhow!(
                        "balance split needs exactly 2 targets, got {}",
                        n_targets
                    ));
                }
                let balance = (byte as f32 - 64.0) / 64.0;
                let a = (1.0 - balance).clamp(0.0, 1.0);
                let b = (1.0 + balance).clamp(0.0, 1.0);
                Ok(vec![a, b])
            }
            Split::Duplicate(scale) => {
                let v = scale.apply(byte)?;
                Ok(vec![v; n_targets])
            }
        }
    }
}

/// One mapping rule for a named Virus parameter. Parameters with no
/// entry in the table are deliberately unmapped.
#[derive(Debug, Clone)]
pub enum MapEntry {
    /// Scale the byte and assign it to a single settings key.
    Direct { target: &'static str, scale: Scale },
    /// One byte drives several settings keys at once.
    FanOut {
        targets: Vec<&'static str>,
        split: Split,
    },
    /// The byte becomes the amount of a modulation-matrix connection.
    ModRoute {
        source: &'static str,
        target: &'static str,
        scale: Scale,
    },
    /// Delegate entirely to a named handler with access to the whole
    /// document. Handlers run even for byte value 0.
    Handler { name: &'static str },
}

/// Static, human-maintained mapping from canonical Virus parameter names
/// to preset fields. Built once at startup, validated, then shared
/// read-only.
#[derive(Debug, Clone)]
pub struct ParameterMap {
    entries: HashMap<&'static str, MapEntry>,
}

impl ParameterMap {
    /// Empty table, for tests and custom setups.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace a rule.
    pub fn insert(&mut self, name: &'static str, entry: MapEntry) {
        self.entries.insert(name, entry);
    }

    /// Look up the rule for a canonical parameter name.
    pub fn get(&self, name: &str) -> Option<&MapEntry> {
        self.entries.get(name)
    }

    /// Number of mapped parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no parameter is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate the table against the handler registry. Every handler
    /// entry must name a registered handler and every fan-out must have
    /// at least one target; a bad entry aborts startup rather than
    /// surfacing mid-batch.
    pub fn validate(&self, handlers: &HandlerRegistry) -> Result<()> {
        for (name, entry) in &self.entries {
            match entry {
                MapEntry::Handler { name: handler } => {
                    if !handlers.contains(handler) {
                        return Err(anyhow!(
                            "parameter '{}' names unregistered handler '{}'",
                            name,
                            handler
                        ));
                    }
                }
                MapEntry::FanOut { targets, split } => {
                    if targets.is_empty() {
                        return Err(anyhow!("parameter '{}' fans out to no targets", name));
                    }
                    if matches!(split, Split::Balance) && targets.len() != 2 {
                        return Err(anyhow!(
                            "parameter '{}' uses a balance split with {} targets",
                            name,
                            targets.len()
                        ));
                    }
                }
                MapEntry::Direct { target, .. } | MapEntry::ModRoute { target, .. } => {
                    if target.is_empty() {
                        return Err(anyhow!("parameter '{}' maps to an empty target", name));
                    }
                }
            }
        }
        Ok(())
    }

    /// The stock Virus-to-Vital table.
    pub fn virus_default() -> Self {
        use MapEntry::*;
        use Scale::*;

        let mut map = Self::new();

        // Controllers and global
        map.insert(
            "Portamento_Time",
            Direct {
                target: "portamento_time",
                scale: Range { lo: -10.0, hi: 4.0 },
            },
        );
        map.insert(
            "Panorama",
            Direct {
                target: "osc_1_pan",
                scale: Bipolar,
            },
        );
        map.insert(
            "Expression",
            Direct {
                target: "macro_control_1",
                scale: Norm,
            },
        );
        map.insert(
            "Patch_Volume",
            Direct {
                target: "volume",
                scale: Range { lo: 0.0, hi: 7000.0 },
            },
        );

        // Oscillators
        map.insert(
            "Osc1_Shape",
            Direct {
                target: "osc_1_wave_frame",
                scale: Range { lo: 0.0, hi: 257.0 },
            },
        );
        map.insert(
            "Osc1_Pulsewidth",
            Direct {
                target: "osc_1_spectral_morph_amount",
                scale: Norm,
            },
        );
        map.insert(
            "Osc1_Semitone",
            Direct {
                target: "osc_1_transpose",
                scale: Range { lo: -48.0, hi: 48.0 },
            },
        );
        map.insert(
            "Osc2_Shape",
            Direct {
                target: "osc_2_wave_frame",
                scale: Range { lo: 0.0, hi: 257.0 },
            },
        );
        map.insert(
            "Osc2_Pulsewidth",
            Direct {
                target: "osc_2_spectral_morph_amount",
                scale: Norm,
            },
        );
        map.insert(
            "Osc2_Semitone",
            Direct {
                target: "osc_2_transpose",
                scale: Range { lo: -48.0, hi: 48.0 },
            },
        );
        map.insert(
            "Osc2_Detune",
            Direct {
                target: "osc_2_tune",
                scale: Bipolar,
            },
        );
        map.insert(
            "Osc2_FM_Amount",
            Direct {
                target: "osc_2_distortion_amount",
                scale: Norm,
            },
        );
        map.insert(
            "Osc_Balance",
            FanOut {
                targets: vec!["osc_1_level", "osc_2_level"],
                split: Split::Balance,
            },
        );
        map.insert(
            "Suboscillator_Volume",
            Direct {
                target: "osc_3_level",
                scale: Norm,
            },
        );
        map.insert("Noise_Volume", Handler { name: "enable_noise" });

        // Filters
        map.insert(
            "Cutoff",
            Direct {
                target: "filter_1_cutoff",
                scale: Range { lo: 8.0, hi: 136.0 },
            },
        );
        map.insert(
            "Cutoff2",
            Direct {
                target: "filter_2_cutoff",
                scale: Range { lo: 8.0, hi: 136.0 },
            },
        );
        map.insert(
            "Filter1_Resonance",
            Direct {
                target: "filter_1_resonance",
                scale: Norm,
            },
        );
        map.insert(
            "Filter2_Resonance",
            Direct {
                target: "filter_2_resonance",
                scale: Norm,
            },
        );
        map.insert(
            "Filter1_Env_Amt",
            ModRoute {
                source: "env_2",
                target: "filter_1_cutoff",
                scale: Bipolar,
            },
        );
        map.insert(
            "Filter2_Env_Amt",
            ModRoute {
                source: "env_2",
                target: "filter_2_cutoff",
                scale: Bipolar,
            },
        );
        map.insert(
            "Filter1_Keyfollow",
            ModRoute {
                source: "note",
                target: "filter_1_cutoff",
                scale: Bipolar,
            },
        );
        map.insert(
            "Filter2_Keyfollow",
            ModRoute {
                source: "note",
                target: "filter_2_cutoff",
                scale: Bipolar,
            },
        );
        map.insert(
            "Filter_Balance",
            Handler {
                name: "set_filter_balance_mix",
            },
        );
        map.insert(
            "Filter_Routing",
            Handler {
                name: "set_filter_routing",
            },
        );
        map.insert(
            "Saturation_Curve",
            Direct {
                target: "filter_1_drive",
                scale: Range { lo: 0.0, hi: 20.0 },
            },
        );

        // Envelopes: Virus filter env lands on env 2, amp env on env 1
        map.insert(
            "Filter_Env_Attack",
            Direct {
                target: "env_2_attack",
                scale: Range { lo: 0.0, hi: 6.0 },
            },
        );
        map.insert(
            "Filter_Env_Decay",
            Direct {
                target: "env_2_decay",
                scale: Range { lo: 0.0, hi: 6.0 },
            },
        );
        map.insert(
            "Filter_Env_Sustain",
            Direct {
                target: "env_2_sustain",
                scale: Norm,
            },
        );
        map.insert(
            "Filter_Env_Release",
            Direct {
                target: "env_2_release",
                scale: Range { lo: 0.0, hi: 6.0 },
            },
        );
        map.insert(
            "Amp_Env_Attack",
            Direct {
                target: "env_1_attack",
                scale: Range { lo: 0.0, hi: 6.0 },
            },
        );
        map.insert(
            "Amp_Env_Decay",
            Direct {
                target: "env_1_decay",
                scale: Range { lo: 0.0, hi: 6.0 },
            },
        );
        map.insert(
            "Amp_Env_Sustain",
            Direct {
                target: "env_1_sustain",
                scale: Norm,
            },
        );
        map.insert(
            "Amp_Env_Release",
            Direct {
                target: "env_1_release",
                scale: Range { lo: 0.0, hi: 6.0 },
            },
        );

        // LFO 1
        map.insert(
            "Lfo1_Rate",
            Direct {
                target: "lfo_1_frequency",
                scale: Range { lo: -7.0, hi: 9.0 },
            },
        );
        map.insert(
            "Osc1_Lfo1_Amount",
            ModRoute {
                source: "lfo_1",
                target: "osc_1_transpose",
                scale: Bipolar,
            },
        );
        map.insert(
            "Osc2_Lfo1_Amount",
            ModRoute {
                source: "lfo_1",
                target: "osc_2_transpose",
                scale: Bipolar,
            },
        );
        map.insert(
            "PW_Lfo1_Amount",
            ModRoute {
                source: "lfo_1",
                target: "osc_1_spectral_morph_amount",
                scale: Bipolar,
            },
        );
        map.insert(
            "Reso_Lfo1_Amount",
            ModRoute {
                source: "lfo_1",
                target: "filter_1_resonance",
                scale: Bipolar,
            },
        );
        map.insert(
            "FiltGain_Lfo1_Amount",
            ModRoute {
                source: "lfo_1",
                target: "filter_1_drive",
                scale: Bipolar,
            },
        );

        // LFO 2
        map.insert(
            "Lfo2_Rate",
            Direct {
                target: "lfo_2_frequency",
                scale: Range { lo: -7.0, hi: 9.0 },
            },
        );
        map.insert(
            "OscShape_Lfo2_Amount",
            ModRoute {
                source: "lfo_2",
                target: "osc_1_wave_frame",
                scale: Bipolar,
            },
        );
        map.insert(
            "FmAmount_Lfo2_Amount",
            ModRoute {
                source: "lfo_2",
                target: "osc_2_distortion_amount",
                scale: Bipolar,
            },
        );
        map.insert(
            "Cutoff1_Lfo2_Amount",
            ModRoute {
                source: "lfo_2",
                target: "filter_1_cutoff",
                scale: Bipolar,
            },
        );
        map.insert(
            "Cutoff2_Lfo2_Amount",
            ModRoute {
                source: "lfo_2",
                target: "filter_2_cutoff",
                scale: Bipolar,
            },
        );
        map.insert(
            "Panorama_Lfo2_Amount",
            ModRoute {
                source: "lfo_2",
                target: "osc_1_pan",
                scale: Bipolar,
            },
        );

        // Unison
        map.insert(
            "Unison_Mode",
            Handler {
                name: "set_unison_voices",
            },
        );
        map.insert(
            "Unison_Detune",
            FanOut {
                targets: vec!["osc_1_unison_detune", "osc_2_unison_detune"],
                split: Split::Duplicate(Range { lo: 0.0, hi: 10.0 }),
            },
        );
        map.insert(
            "Unison_Panorama_Spread",
            FanOut {
                targets: vec!["osc_1_stereo_spread", "osc_2_stereo_spread"],
                split: Split::Duplicate(Norm),
            },
        );

        // Velocity response
        map.insert(
            "Amp_Velocity",
            Direct {
                target: "velocity_track",
                scale: Norm,
            },
        );
        map.insert(
            "Panorama_Velocity",
            ModRoute {
                source: "velocity",
                target: "osc_1_pan",
                scale: Bipolar,
            },
        );
        map.insert(
            "Filter1_EnvAmt_Velocity",
            ModRoute {
                source: "velocity",
                target: "filter_1_cutoff",
                scale: Bipolar,
            },
        );

        // Effects
        map.insert(
            "Chorus_Mix",
            Direct {
                target: "chorus_dry_wet",
                scale: Norm,
            },
        );
        map.insert(
            "Chorus_Rate",
            Direct {
                target: "chorus_frequency",
                scale: Range { lo: -6.0, hi: 3.0 },
            },
        );
        map.insert(
            "Chorus_Feedback",
            Direct {
                target: "chorus_feedback",
                scale: Bipolar,
            },
        );
        map.insert(
            "Effect_Send",
            Direct {
                target: "delay_dry_wet",
                scale: Norm,
            },
        );
        map.insert(
            "Delay_Time",
            Direct {
                target: "delay_frequency",
                scale: Recip { num: 64.0 },
            },
        );
        map.insert(
            "Delay_Feedback",
            Direct {
                target: "delay_feedback",
                scale: Norm,
            },
        );
        map.insert(
            "Phaser_Mix",
            Direct {
                target: "phaser_dry_wet",
                scale: Norm,
            },
        );
        map.insert(
            "Phaser_Rate",
            Direct {
                target: "phaser_frequency",
                scale: Range { lo: -5.0, hi: 2.0 },
            },
        );
        map.insert(
            "Phaser_Feedback",
            Direct {
                target: "phaser_feedback",
                scale: Norm,
            },
        );
        map.insert(
            "Distortion_Intensity",
            Direct {
                target: "distortion_drive",
                scale: Range { lo: 0.0, hi: 30.0 },
            },
        );

        map
    }
}

impl Default for ParameterMap {
    fn default() -> Self {
        Self::virus_default()
    }
}
