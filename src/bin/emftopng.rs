//! EMF images converter.
//!
//! Reads an Enhanced Metafile and writes a PNG: from a file argument to a
//! sibling `.png`, or from piped stdin to stdout.

use clap::{CommandFactory, Parser};
use std::io::{IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Convert EMF vector images to PNG
#[derive(Parser, Debug)]
#[command(name = "emftopng", about = "EMF images converter", version)]
struct Args {
    /// Input EMF file; reads from stdin when omitted
    #[arg(value_name = "inputfile")]
    input: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let data = match read_input(&args) {
        Ok(Some(data)) => data,
        Ok(None) => {
            // no file and stdin is a terminal: nothing to convert
            eprint!("{}", Args::command().render_help());
            return ExitCode::from(2);
        }
        Err(err) => return fail(err.into()),
    };

    let png = match emfplay::convert_emf_to_png(&data) {
        Ok(png) => png,
        Err(err) => return fail(err.into()),
    };

    let result = match &args.input {
        Some(path) => std::fs::write(output_path(path), png),
        None => std::io::stdout().write_all(&png),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(err.into()),
    }
}

fn read_input(args: &Args) -> std::io::Result<Option<Vec<u8>>> {
    match &args.input {
        Some(path) => std::fs::read(path).map(Some),
        None => {
            let stdin = std::io::stdin();
            if stdin.is_terminal() {
                return Ok(None);
            }
            let mut data = Vec::new();
            stdin.lock().read_to_end(&mut data)?;
            Ok(Some(data))
        }
    }
}

/// `drawing.emf` becomes `drawing.png` next to it; other names just get
/// the `.png` suffix appended.
fn output_path(input: &Path) -> PathBuf {
    let name = input.file_name().and_then(|n| n.to_str()).unwrap_or("");
    match name.strip_suffix(".emf") {
        Some(stem) => input.with_file_name(format!("{stem}.png")),
        None => input.with_file_name(format!("{name}.png")),
    }
}

fn fail(err: Box<dyn std::error::Error>) -> ExitCode {
    eprintln!("emf: {err}");
    ExitCode::FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_replaces_emf_suffix() {
        assert_eq!(
            output_path(Path::new("/tmp/drawing.emf")),
            PathBuf::from("/tmp/drawing.png")
        );
        assert_eq!(
            output_path(Path::new("chart.EMF.emf")),
            PathBuf::from("chart.EMF.png")
        );
        assert_eq!(
            output_path(Path::new("raw.bin")),
            PathBuf::from("raw.bin.png")
        );
    }
}
