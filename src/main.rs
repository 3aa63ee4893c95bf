use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use virus2vital::handlers::HandlerRegistry;
use virus2vital::mapping::MappingEngine;
use virus2vital::params::{ParameterMap, PARAM_NAMES};
use virus2vital::vital::PresetDocument;
use virus2vital::{midi, pipeline, sysex};

/// Convert Access Virus sysex dumps and MIDI performances into Vital
/// and Serum-style presets
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the Virus single dumps found in MIDI files
    List {
        /// MIDI files to scan
        midi_files: Vec<PathBuf>,
    },
    /// Convert embedded single dumps into .vital patches
    Convert {
        /// MIDI files carrying sysex dumps
        midi_files: Vec<PathBuf>,

        /// Base preset template (.vital, optionally gzipped)
        #[arg(long)]
        template: PathBuf,

        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Synthesize a patch from a plain MIDI performance
    Perform {
        /// MIDI file with note data
        midi_file: PathBuf,

        /// Base preset template (.vital, optionally gzipped)
        #[arg(long)]
        template: PathBuf,

        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Pack the first single dump of a MIDI file as a .fxp preset
    Fxp {
        /// MIDI file carrying sysex dumps
        midi_file: PathBuf,

        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Commands::List { midi_files } => {
            for path in &midi_files {
                let (events, _) = midi::read_file(path)?;
                let blocks = sysex::extract_blocks(&events);
                println!("{}: {} single dump(s)", path.display(), blocks.len());
                for (i, block) in blocks.iter().enumerate() {
                    let name = block.patch_name().unwrap_or_else(|| "<unnamed>".to_string());
                    println!("  {}: {}", i + 1, name);
                }
            }
            Ok(())
        }
        Commands::Convert {
            midi_files,
            template,
            out_dir,
        } => {
            // Table problems abort before any input is touched.
            let table = ParameterMap::virus_default();
            let handlers = HandlerRegistry::builtin();
            let engine = MappingEngine::new(&table, &handlers, &PARAM_NAMES)
                .context("invalid parameter mapping table")?;
            let template = PresetDocument::load(&template)?;

            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("cannot create '{}'", out_dir.display()))?;

            // A bad input fails alone; the batch continues.
            let mut failures = 0usize;
            for path in &midi_files {
                match pipeline::convert_file(path, &template, &engine, &out_dir) {
                    Ok(written) => {
                        println!("{}: {} patch(es)", path.display(), written.len())
                    }
                    Err(e) => {
                        log::error!("skipping '{}': {:#}", path.display(), e);
                        failures += 1;
                    }
                }
            }
            if failures == midi_files.len() && !midi_files.is_empty() {
                anyhow::bail!("all {} input file(s) failed", failures);
            }
            Ok(())
        }
        Commands::Perform {
            midi_file,
            template,
            out_dir,
        } => {
            let template = PresetDocument::load(&template)?;
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("cannot create '{}'", out_dir.display()))?;
            let path = pipeline::convert_performance(&midi_file, &template, &out_dir)?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Fxp { midi_file, out } => {
            pipeline::convert_fxp(&midi_file, &out)?;
            println!("{}", out.display());
            Ok(())
        }
    }
}
