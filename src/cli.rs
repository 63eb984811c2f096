use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_INPUT: &str = "Retail-Transaction-Dataset_raw.csv";
pub const DEFAULT_OUTPUT: &str = "output/Retail-Transaction-Dataset_clean.csv";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Clean a retail transaction table: dedupe, drop incomplete rows, normalize and encode columns",
    long_about = None
)]
pub struct Cli {
    /// Raw transaction table to clean
    #[arg(short = 'i', long = "input", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,
    /// Destination for the cleaned table (parent directories are created)
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
    /// Suppress progress output
    #[arg(long)]
    pub quiet: bool,
    /// Field delimiter (supports ',', 'tab', ';', '|'); inferred from the input extension when omitted
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Write the label-to-code mappings of encoded columns to this JSON file
    #[arg(long = "encodings")]
    pub encodings: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
