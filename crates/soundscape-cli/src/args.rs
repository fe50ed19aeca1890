//! Command-line argument parsing for the soundscape CLI.
//!
//! This module handles parsing and validation of CLI arguments including:
//! - Mixer channel capacity override
//! - Help text generation

use std::env;

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Mixer channel capacity override (None = engine default)
    pub channels: Option<usize>,
    /// Whether help was requested
    pub show_help: bool,
}

impl CliArgs {
    /// Parse arguments from the command line.
    pub fn parse() -> Self {
        Self::parse_from(env::args().skip(1))
    }

    /// Parse arguments from an explicit iterator.
    pub fn parse_from(args: impl Iterator<Item = String>) -> Self {
        let mut parsed = Self::default();
        let mut iter = args;

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => {
                    parsed.show_help = true;
                }
                "--channels" => {
                    if let Some(value) = iter.next() {
                        parsed.apply_channels(&value);
                    } else {
                        eprintln!("--channels requires a number");
                        parsed.show_help = true;
                    }
                }
                _ if arg.starts_with("--channels=") => {
                    let value = arg["--channels=".len()..].to_string();
                    parsed.apply_channels(&value);
                }
                _ => {
                    eprintln!("Unknown argument: {}", arg);
                    parsed.show_help = true;
                }
            }
        }

        parsed
    }

    fn apply_channels(&mut self, value: &str) {
        match value.parse::<usize>() {
            Ok(n) if n > 0 => self.channels = Some(n),
            _ => {
                eprintln!("Invalid channel count: {}", value);
                self.show_help = true;
            }
        }
    }

    /// Print help text to stderr.
    pub fn print_help() {
        eprintln!(
            "Usage:\n  soundscape [--channels <n>]\n\n\
             Flags:\n\
             \x20 --channels <n>   Number of mixer channels to reserve (default 18)\n\
             \x20 -h, --help       Show this help\n\n\
             The player starts an interactive prompt; type 'help' there for\n\
             the command list.\n"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::parse_from(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_arguments_is_the_default_run() {
        let args = parse(&[]);
        assert!(!args.show_help);
        assert_eq!(args.channels, None);
    }

    #[test]
    fn channels_flag_both_spellings() {
        assert_eq!(parse(&["--channels", "24"]).channels, Some(24));
        assert_eq!(parse(&["--channels=6"]).channels, Some(6));
    }

    #[test]
    fn bad_channel_counts_request_help() {
        assert!(parse(&["--channels", "zero"]).show_help);
        assert!(parse(&["--channels=0"]).show_help);
        assert!(parse(&["--channels"]).show_help);
    }

    #[test]
    fn unknown_arguments_request_help() {
        assert!(parse(&["--what"]).show_help);
        assert!(parse(&["stray"]).show_help);
    }
}
