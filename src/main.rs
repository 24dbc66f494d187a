use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use music_composer::symbols::{list_controllers, list_instruments, list_percussion};
use music_composer::{description_schema, ComposerConfig, FileGenerator, MusicComposer};

#[derive(Parser)]
#[command(name = "music-composer", about = "Sequence music descriptions into MIDI and audio")]
#[command(version)]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a description JSON file as MIDI and render it to audio
    Compose {
        /// Path to a description .json file
        description: PathBuf,

        /// MIDI output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Audio output path
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Only write the MIDI file
        #[arg(long)]
        no_render: bool,

        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override MIDI resolution
        #[arg(long)]
        ticks_per_beat: Option<u16>,
    },

    /// Print the JSON schema descriptions must follow
    Schema,

    /// List the names the resolver understands
    List {
        #[arg(value_enum)]
        table: Table,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
    Instruments,
    Drums,
    Controllers,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Command::Compose {
            description,
            output,
            audio,
            no_render,
            config,
            ticks_per_beat,
        } => {
            let mut config = load_config(config.as_deref());
            if let Some(output) = output {
                config.output_midi = output;
            }
            if let Some(audio) = audio {
                config.output_audio = audio;
            }
            if let Some(ticks_per_beat) = ticks_per_beat {
                config.ticks_per_beat = ticks_per_beat;
            }
            if let Err(e) = config.validate() {
                fail("Config error", e);
            }

            compose(config, description, no_render);
        }
        Command::Schema => match serde_json::to_string_pretty(&description_schema()) {
            Ok(text) => println!("{}", text),
            Err(e) => fail("Schema error", e),
        },
        Command::List { table } => {
            let entries = match table {
                Table::Instruments => list_instruments(),
                Table::Drums => list_percussion(),
                Table::Controllers => list_controllers(),
            };
            for (name, code) in entries {
                println!("{:>3}  {}", code, name);
            }
        }
    }
}

fn compose(config: ComposerConfig, description: PathBuf, no_render: bool) {
    let composer = MusicComposer::new(config, Box::new(FileGenerator::new(&description)));

    let composition = composer
        .generate_midi(&description.display().to_string())
        .unwrap_or_else(|e| fail("Compose error", e));
    println!(
        "Wrote {} ({} tracks, {} of {} events)",
        composition.midi_path.display(),
        composition.track_count,
        composition.report.events_sequenced,
        composition.report.events_total
    );

    if no_render {
        return;
    }
    match composer.render(&composition) {
        Ok(Some(audio)) => println!("Rendered {}", audio.display()),
        Ok(None) => println!("No soundfont configured; set SOUNDFONT to render audio"),
        Err(e) => fail("Render error", e),
    }
}

fn load_config(path: Option<&Path>) -> ComposerConfig {
    ComposerConfig::load(path).unwrap_or_else(|e| fail("Config error", e))
}

fn fail(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", context, error);
    std::process::exit(1);
}
