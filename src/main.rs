use std::env;
use std::io;
use std::path::PathBuf;
use std::process;

use osh::{logging, meta, selftest, Config, Shell};

fn print_usage() -> ! {
    eprintln!("Usage: osh [--config <path>] [--meta <path>] [--interactive | -c <line> | -- <line...>]");
    process::exit(2);
}

enum Mode {
    SelfTest,
    Interactive,
    Line(String),
}

struct Args {
    mode: Mode,
    meta_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut mode = Mode::SelfTest;
    let mut meta_path = None;
    let mut config_path = None;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--interactive" => mode = Mode::Interactive,
            "-c" => {
                i += 1;
                let line = args.get(i).cloned().unwrap_or_else(|| print_usage());
                mode = Mode::Line(line);
            }
            "--meta" => {
                i += 1;
                meta_path = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| print_usage()));
            }
            "--config" => {
                i += 1;
                config_path = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| print_usage()));
            }
            "--" => {
                mode = Mode::Line(args[i + 1..].join(" "));
                break;
            }
            _ => print_usage(),
        }
        i += 1;
    }

    Args {
        mode,
        meta_path,
        config_path,
    }
}

fn main() {
    let args = parse_args();
    let config = match &args.config_path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    logging::init(config.log_level);

    let mut shell = Shell::new(config);
    let single_line = matches!(args.mode, Mode::Line(_));
    let report = match args.mode {
        Mode::SelfTest => selftest::run(&mut shell),
        Mode::Interactive => match shell.interactive(io::stdin().lock()) {
            Ok(report) => report,
            Err(e) => {
                eprintln!("osh: {}", e);
                process::exit(1);
            }
        },
        Mode::Line(line) => shell.process_line(&line),
    };

    if let (Some(path), Some(report)) = (&args.meta_path, &report) {
        if let Err(e) = meta::write_meta(path, report) {
            eprintln!("osh: failed to write meta: {}", e);
        }
    }

    // Interactive sessions end cleanly; a single line reports its status.
    let code = match &report {
        Some(report) if single_line => report.exit_code(),
        _ => 0,
    };
    process::exit(code);
}
