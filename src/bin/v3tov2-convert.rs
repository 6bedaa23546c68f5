use std::path::{Path, PathBuf};

use clap::Parser;

use v3tov2_proxy::dump::pretty;
use v3tov2_proxy::translate::translate_bytes;

#[derive(Parser)]
#[command(name = "v3tov2-convert")]
#[command(about = "Convert a saved v3 schedule response into the v2 layout", long_about = None)]
struct Cli {
    /// Saved v3 response, e.g. response-v3-r1-2026-02-05-dump.json
    input: PathBuf,

    /// Service key expected in the v3 envelope (r1, r2, r3, ...)
    #[arg(short, long)]
    service: String,

    /// Output file [default: input name with v3 → v2 and dump → converted]
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let raw = std::fs::read(&cli.input)?;
    let (_, envelope) = translate_bytes(&raw, Some(cli.service.as_str()))?;

    let output = cli.output.unwrap_or_else(|| default_output(&cli.input));
    std::fs::write(&output, pretty(&envelope)?)?;

    println!(
        "{} programs written to {}",
        envelope.programs.len(),
        output.display()
    );
    Ok(())
}

fn default_output(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let renamed = name.replace("v3", "v2").replace("dump", "converted");
    if renamed == name {
        // Never overwrite the input.
        let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
        return input.with_file_name(format!("{stem}-converted.json"));
    }
    input.with_file_name(renamed)
}
