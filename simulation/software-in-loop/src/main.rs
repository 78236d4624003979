use std::path::PathBuf;
use std::process::exit;

use software_in_loop::config::SilConfig;

fn main() {
    let Some(config_path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: fcu-sil <config.json>");
        exit(2);
    };

    let config = match SilConfig::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}: {err}", config_path.display());
            exit(1);
        }
    };

    match software_in_loop::run(&config, Box::new(std::io::stdout())) {
        Ok(summary) => {
            eprintln!("Ran {} ticks, ended in {}", summary.ticks, summary.final_phase.name());

            for (time, phase) in &summary.phases {
                eprintln!("  {:>8} ms  {}", time, phase.name());
            }
            for event in &summary.output_events {
                let state = if event.state { "on" } else { "off" };
                eprintln!("  {:>8} ms  {:?} {}", event.timestamp, event.channel, state);
            }
        }
        Err(err) => {
            eprintln!("{err}");
            exit(1);
        }
    }
}
