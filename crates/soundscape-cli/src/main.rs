//! Randomized ambient soundscape player.
//!
//! Interactive command-line tool that layers looping and randomly-triggered
//! sounds into a soundscape:
//! - Per-track loop / randomize / one-shot scheduling
//! - Live volume, fade-out, and enable/disable control
//! - Graceful faded shutdown

mod args;
mod shell;

use anyhow::{Context, Result};
use soundscape_engine::{RodioMixer, Soundscape};

use args::CliArgs;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    if args.show_help {
        CliArgs::print_help();
        return Ok(());
    }

    let mixer = match args.channels {
        Some(n) => RodioMixer::with_capacity(n),
        None => RodioMixer::new(),
    }
    .context("audio output unavailable")?;

    println!("soundscape: digital soundscape engine");
    println!(
        "Mixer ready with {} channels. Type 'help' for commands.\n",
        mixer.capacity()
    );

    let mut scape = Soundscape::new(Box::new(mixer));
    shell::run(&mut scape).context("command prompt failed")?;

    Ok(())
}
