//! An interactive reverse Polish calculator.

use std::sync::Arc;

use arrrg::CommandLine;
use indicio::{clue, stdio::StdioEmitter, ALWAYS, INFO};

use rpncalc::{Error, LineEditorConsole, ScriptConsole, Shell, ShellOptions, COLLECTOR};

fn run(options: &ShellOptions) -> Result<(), Error> {
    match &options.script {
        Some(script) => {
            let console = ScriptConsole::from_path(script, std::io::stdout())?;
            Shell::new(console).run()
        }
        None => {
            let console = LineEditorConsole::new(&options.prompt)?;
            Shell::new(console).run()
        }
    }
}

fn main() {
    let (options, free) = ShellOptions::from_command_line("Usage: rpncalc [OPTIONS]");
    if !free.is_empty() {
        eprintln!("command takes no positional arguments");
        std::process::exit(1);
    }
    if options.verbose {
        let emitter = Arc::new(StdioEmitter);
        COLLECTOR.register(emitter);
        COLLECTOR.set_verbosity(INFO);
        clue!(COLLECTOR, ALWAYS, {
            new_process: std::env::args().map(String::from).collect::<Vec<_>>(),
        });
    }
    if let Err(err) = run(&options) {
        eprintln!("rpncalc: {}", err);
        std::process::exit(1);
    }
}
