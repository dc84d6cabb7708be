// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use tracing::warn;

use wavplay::browser::SiblingFiles;
use wavplay::config::EngineSettings;
use wavplay::host::{self, RenderOptions, TriggerSchedule};
use wavplay::modes::{LoopMode, TriggerMode};
use wavplay::samples::SampleLoader;
use wavplay::session::Session;
use wavplay::util::{filename_display, sample_length_display, seconds_to_ticks};

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A trigger-driven sample player."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plays a sample through the offline host and writes the output to a WAV file.
    Render {
        /// The sample to play.
        sample: PathBuf,
        /// Where to write the rendered audio.
        output: PathBuf,
        /// The loop mode: off, loop, ping_pong, crossfade_loop, or its number.
        /// Defaults to the restored session's mode, or off.
        #[arg(short, long)]
        mode: Option<LoopMode>,
        /// Stop playback when the trigger falls.
        #[arg(short, long)]
        gate: bool,
        /// The pitch knob position, nominally 0 to 1.
        #[arg(short, long, default_value_t = 0.0)]
        pitch: f32,
        /// Pitch CV in volts per octave. Leave unset for an unpatched input.
        #[arg(long, allow_negative_numbers = true)]
        cv: Option<f32>,
        /// Seconds of audio to render.
        #[arg(short, long, default_value_t = 2.0)]
        seconds: f64,
        /// How long each trigger stays high, in seconds.
        #[arg(long, default_value_t = 0.5)]
        gate_seconds: f64,
        /// Retrigger with this period, in seconds.
        #[arg(long)]
        retrigger_every: Option<f64>,
        /// Press the mode button at these times, in seconds.
        #[arg(long, value_delimiter = ',')]
        mode_press: Vec<f64>,
        /// The tick rate of the render. Defaults to the sample's own rate.
        #[arg(long)]
        sample_rate: Option<u32>,
        /// Engine settings file (YAML).
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Session document to restore the mode from and save to afterwards.
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Prints the decoded metadata of a sample.
    Info {
        /// The sample to inspect.
        sample: PathBuf,
    },
    /// Lists the sibling samples of a file and its position among them.
    Browse {
        /// The sample whose directory to list.
        sample: PathBuf,
        /// Engine settings file (YAML), for the extension filter.
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Lists the loop modes and the numbers they are saved as.
    Modes {},
}

fn load_settings(path: Option<&PathBuf>) -> Result<EngineSettings, Box<dyn Error>> {
    Ok(match path {
        Some(path) => EngineSettings::deserialize(path)?,
        None => EngineSettings::default(),
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            sample,
            output,
            mode,
            gate,
            pitch,
            cv,
            seconds,
            gate_seconds,
            retrigger_every,
            mode_press,
            sample_rate,
            settings,
            state,
        } => {
            let settings = load_settings(settings.as_ref())?;
            let mut session = Session::new(settings);

            if let Some(state) = &state {
                if let Some(e) = session.restore(state)? {
                    warn!(err = %e, "Saved sample could not be reloaded");
                }
            }
            if let Some(mode) = mode {
                session.set_mode(mode);
            }
            let buffer = session.load_file(&sample)?;
            let tick_rate = sample_rate.unwrap_or(buffer.sample_rate());

            let ticks = seconds_to_ticks(seconds, tick_rate);
            let gate_ticks = seconds_to_ticks(gate_seconds, tick_rate).max(1);
            let trigger = match retrigger_every {
                Some(period) => TriggerSchedule::Every {
                    period_ticks: seconds_to_ticks(period, tick_rate).max(1),
                    gate_ticks,
                },
                None => TriggerSchedule::Once { gate_ticks },
            };
            let options = RenderOptions {
                ticks,
                trigger,
                trigger_mode: if gate {
                    TriggerMode::Gate
                } else {
                    TriggerMode::OneShot
                },
                pitch_knob: pitch,
                pitch_cv: cv,
                mode_presses: mode_press
                    .iter()
                    .map(|seconds| seconds_to_ticks(*seconds, tick_rate))
                    .collect(),
            };

            let mut engine = session.engine();
            let render = host::render(&mut engine, &options);
            render.write_wav(&output, tick_rate, session.settings().output_gain())?;

            println!(
                "Rendered {} ({} ticks at {} Hz, playing for {} ticks, mode {}) to {}",
                buffer.name(),
                ticks,
                tick_rate,
                render.playing_ticks,
                session.loop_mode(),
                output.display()
            );

            if let Some(state) = &state {
                session.save(state)?;
            }
        }
        Commands::Info { sample } => {
            let buffer = SampleLoader::default().load(&sample)?;
            println!("{}:", buffer.name());
            println!("  Channels:    {}", buffer.channels());
            println!("  Sample rate: {} Hz", buffer.sample_rate());
            println!("  Frames:      {}", buffer.frame_count());
            println!("  Length:      {}", sample_length_display(buffer.duration()));
            println!("  Memory:      {} KiB", buffer.memory_size() / 1024);
        }
        Commands::Browse { sample, settings } => {
            let settings = load_settings(settings.as_ref())?;
            let siblings = SiblingFiles::scan(&sample, settings.extensions());

            if siblings.is_empty() {
                println!("No samples found next to {}.", sample.display());
                return Ok(());
            }

            println!("Samples (count: {}):", siblings.files().len());
            for (index, path) in siblings.files().iter().enumerate() {
                let marker = if siblings.current() == Some(index) {
                    "*"
                } else {
                    " "
                };
                println!("{} {:>3} {}", marker, index, filename_display(path));
            }
            match siblings.current() {
                Some(index) => println!("{} is sample {}.", filename_display(&sample), index),
                None => println!("{} is not among them.", filename_display(&sample)),
            }
        }
        Commands::Modes {} => {
            for mode in LoopMode::ALL {
                println!("{} {}", mode.index(), mode);
            }
        }
    }

    Ok(())
}
