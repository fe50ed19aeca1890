//! Interactive command shell.
//!
//! Line-based dispatcher translating prompt input into soundscape calls.
//! Malformed argument lists print a usage line and change nothing; per-track
//! failures are reported and never end the session. Only `quit` (or
//! end-of-input) leaves the loop, after the graceful shutdown sequence.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use soundscape_engine::{Soundscape, TrackSettings};

const PROMPT: &str = "soundscape> ";

const USAGE_LOAD: &str = "Please supply a path to a sound file and a track name.\n\
                          Optional settings: loop=<true|false> randomize=<n> volume=<0.0-1.0> fadein=<percent>";
const USAGE_NAME: &str = "Please supply only a track name.";
const USAGE_VOLUME: &str = "Please supply a track name and a volume scale from 0.0 to 1.0.";
const USAGE_FADEOUT: &str = "Please supply a track name and a duration in milliseconds.";

/// A parsed prompt line.
#[derive(Debug, PartialEq)]
enum Command {
    LoadTrack {
        path: PathBuf,
        name: String,
        settings: TrackSettings,
    },
    ListTracks,
    ListPlaying,
    Enable(String),
    Disable(String),
    SetVolume(String, f32),
    FadeOut(String, u64),
    Begin,
    Start,
    Stop,
    Help,
    Quit,
    /// Malformed input; the payload is the usage line to print.
    Usage(&'static str),
    Unknown(String),
    Empty,
}

/// Whether the session continues after a command.
#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

/// Run the interactive prompt until `quit` or end-of-input.
pub fn run(scape: &mut Soundscape) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        let command = match lines.next() {
            Some(line) => parse_line(&line?),
            None => {
                // End-of-input shuts down like an explicit quit
                println!();
                Command::Quit
            }
        };

        if dispatch(scape, command) == Flow::Quit {
            return Ok(());
        }
    }
}

fn dispatch(scape: &mut Soundscape, command: Command) -> Flow {
    match command {
        Command::LoadTrack {
            path,
            name,
            settings,
        } => match scape.load_track(&path, &name, settings) {
            Ok(()) => println!("Track {} loaded.", name),
            Err(err) => println!("{}", err),
        },
        Command::ListTracks => {
            println!("Loaded tracks:");
            for name in scape.track_names() {
                println!(" {}", name);
            }
        }
        Command::ListPlaying => {
            println!("Playing tracks:");
            for name in scape.playing() {
                println!(" {}", name);
            }
        }
        Command::Enable(name) => {
            if let Err(err) = scape.enable(&name) {
                println!("{}", err);
            }
        }
        Command::Disable(name) => {
            if let Err(err) = scape.disable(&name) {
                println!("{}", err);
            }
        }
        Command::SetVolume(name, volume) => {
            if let Err(err) = scape.set_volume(&name, volume) {
                println!("{}", err);
            }
        }
        Command::FadeOut(name, millis) => {
            if let Err(err) = scape.fade_out(&name, Duration::from_millis(millis)) {
                println!("{}", err);
            }
        }
        Command::Begin => scape.begin(),
        Command::Start => scape.start(),
        Command::Stop => scape.stop(),
        Command::Help => print_commands(),
        Command::Quit => {
            println!("Shutting down.");
            scape.quit();
            return Flow::Quit;
        }
        Command::Usage(usage) => println!("{}", usage),
        Command::Unknown(word) => {
            println!("Unknown command: {}. Type 'help' for the command list.", word)
        }
        Command::Empty => {}
    }
    Flow::Continue
}

fn print_commands() {
    println!(
        "Commands:\n\
         \x20 load_track <path> <name> [settings]  Load a sound into a track\n\
         \x20                                       (loop=<true|false> randomize=<n>\n\
         \x20                                        volume=<0.0-1.0> fadein=<percent>)\n\
         \x20 list_tracks                           List loaded tracks\n\
         \x20 list_playing                          List audible tracks\n\
         \x20 enable <name>                         Let a track play\n\
         \x20 disable <name>                        Silence a track\n\
         \x20 set_volume <name> <0.0-1.0>           Set a track's gain\n\
         \x20 fadeout <name> <millis>               Fade a track out\n\
         \x20 begin                                 Start all track schedulers\n\
         \x20 start                                 Enable all tracks\n\
         \x20 stop                                  Disable all tracks\n\
         \x20 quit                                  Fade out and exit"
    );
}

fn parse_line(line: &str) -> Command {
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Command::Empty;
    };
    let args: Vec<&str> = words.collect();

    match keyword {
        "load_track" => parse_load_track(&args),
        "list_tracks" => Command::ListTracks,
        "list_playing" => Command::ListPlaying,
        "enable" => match args.as_slice() {
            [name] => Command::Enable(name.to_string()),
            _ => Command::Usage(USAGE_NAME),
        },
        "disable" => match args.as_slice() {
            [name] => Command::Disable(name.to_string()),
            _ => Command::Usage(USAGE_NAME),
        },
        "set_volume" => match args.as_slice() {
            [name, volume] => match volume.parse::<f32>() {
                Ok(volume) => Command::SetVolume(name.to_string(), volume),
                Err(_) => Command::Usage(USAGE_VOLUME),
            },
            _ => Command::Usage(USAGE_VOLUME),
        },
        "fadeout" => match args.as_slice() {
            [name, millis] => match millis.parse::<u64>() {
                Ok(millis) => Command::FadeOut(name.to_string(), millis),
                Err(_) => Command::Usage(USAGE_FADEOUT),
            },
            _ => Command::Usage(USAGE_FADEOUT),
        },
        "begin" => Command::Begin,
        "start" => Command::Start,
        "stop" => Command::Stop,
        "help" => Command::Help,
        "quit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

fn parse_load_track(args: &[&str]) -> Command {
    let [path, name, rest @ ..] = args else {
        return Command::Usage(USAGE_LOAD);
    };
    match parse_settings(rest) {
        Ok(settings) => Command::LoadTrack {
            path: PathBuf::from(path),
            name: name.to_string(),
            settings,
        },
        Err(usage) => Command::Usage(usage),
    }
}

/// Parse optional trailing `key=value` settings for `load_track`.
fn parse_settings(pairs: &[&str]) -> Result<TrackSettings, &'static str> {
    let mut settings = TrackSettings::default();

    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(USAGE_LOAD);
        };
        match key {
            "loop" => settings.loop_mode = value.parse::<bool>().map_err(|_| USAGE_LOAD)?,
            "randomize" => settings.randomize = value.parse::<u32>().map_err(|_| USAGE_LOAD)?,
            "volume" => settings.volume = value.parse::<f32>().map_err(|_| USAGE_LOAD)?,
            "fadein" => settings.fadein_percent = value.parse::<u32>().map_err(|_| USAGE_LOAD)?,
            _ => return Err(USAGE_LOAD),
        }
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_unknown_lines() {
        assert_eq!(parse_line(""), Command::Empty);
        assert_eq!(parse_line("   "), Command::Empty);
        assert_eq!(
            parse_line("loudness up"),
            Command::Unknown("loudness".to_string())
        );
    }

    #[test]
    fn load_track_with_defaults() {
        let Command::LoadTrack {
            path,
            name,
            settings,
        } = parse_line("load_track data/wind.ogg wind")
        else {
            panic!("expected a load command");
        };
        assert_eq!(path, PathBuf::from("data/wind.ogg"));
        assert_eq!(name, "wind");
        assert_eq!(settings, TrackSettings::default());
    }

    #[test]
    fn load_track_with_settings() {
        let Command::LoadTrack { settings, .. } =
            parse_line("load_track data/gulls.ogg gulls loop=false randomize=400 volume=0.5 fadein=0")
        else {
            panic!("expected a load command");
        };
        assert!(!settings.loop_mode);
        assert_eq!(settings.randomize, 400);
        assert_eq!(settings.volume, 0.5);
        assert_eq!(settings.fadein_percent, 0);
    }

    #[test]
    fn load_track_argument_errors() {
        assert_eq!(parse_line("load_track"), Command::Usage(USAGE_LOAD));
        assert_eq!(parse_line("load_track onlypath"), Command::Usage(USAGE_LOAD));
        assert_eq!(
            parse_line("load_track p n loop=maybe"),
            Command::Usage(USAGE_LOAD)
        );
        assert_eq!(
            parse_line("load_track p n tempo=9"),
            Command::Usage(USAGE_LOAD)
        );
    }

    #[test]
    fn single_name_commands() {
        assert_eq!(parse_line("enable wind"), Command::Enable("wind".into()));
        assert_eq!(parse_line("disable wind"), Command::Disable("wind".into()));
        assert_eq!(parse_line("enable"), Command::Usage(USAGE_NAME));
        assert_eq!(parse_line("disable a b"), Command::Usage(USAGE_NAME));
    }

    #[test]
    fn set_volume_parses_or_prints_usage() {
        assert_eq!(
            parse_line("set_volume wind 0.4"),
            Command::SetVolume("wind".into(), 0.4)
        );
        assert_eq!(parse_line("set_volume wind"), Command::Usage(USAGE_VOLUME));
        assert_eq!(
            parse_line("set_volume wind loud"),
            Command::Usage(USAGE_VOLUME)
        );
    }

    #[test]
    fn fadeout_parses_or_prints_usage() {
        assert_eq!(
            parse_line("fadeout wind 2000"),
            Command::FadeOut("wind".into(), 2000)
        );
        assert_eq!(parse_line("fadeout wind"), Command::Usage(USAGE_FADEOUT));
        assert_eq!(
            parse_line("fadeout wind soon"),
            Command::Usage(USAGE_FADEOUT)
        );
    }

    #[test]
    fn global_commands() {
        assert_eq!(parse_line("begin"), Command::Begin);
        assert_eq!(parse_line("start"), Command::Start);
        assert_eq!(parse_line("stop"), Command::Stop);
        assert_eq!(parse_line("help"), Command::Help);
        assert_eq!(parse_line("quit"), Command::Quit);
        assert_eq!(parse_line("list_tracks"), Command::ListTracks);
        assert_eq!(parse_line("list_playing"), Command::ListPlaying);
    }
}
