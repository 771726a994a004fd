//! OxiSum CLI - The Oxidized Checksummer
//!
//! A Pure Rust implementation of the POSIX `cksum` utility with
//! hardware-accelerated CRC backends.

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{Shell, generate};
use oxisum_core::prelude::*;
use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "oxisum")]
#[command(
    author,
    version,
    about = "The Oxidized Checksummer - POSIX cksum in pure Rust"
)]
#[command(long_about = "
OxiSum computes the POSIX cksum CRC and byte count of each FILE.
With no FILE, or when FILE is -, it reads standard input.

Examples:
  oxisum file.bin
  oxisum a.txt b.txt c.txt
  cat file.bin | oxisum
  oxisum --raw file.bin > file.crc
  oxisum --tag file.bin
")]
struct Cli {
    /// Files to checksum (use "-" for standard input)
    files: Vec<String>,

    /// Emit the checksum as four big-endian bytes (single input only)
    #[arg(long)]
    raw: bool,

    /// BSD-style tagged output: CRC (file) = checksum length
    #[arg(long, conflicts_with = "raw")]
    tag: bool,

    /// Write and flush each result as soon as its file is done, instead of
    /// buffering the whole run
    #[arg(long)]
    per_file_flush: bool,

    /// Checksum algorithm
    #[arg(short = 'a', long, value_enum, default_value_t = Algorithm::Crc)]
    algorithm: Algorithm,

    /// Generate shell completion scripts
    #[arg(long, value_enum, hide = true)]
    completion: Option<Shell>,
}

/// Checksum algorithm (for clap ValueEnum).
///
/// POSIX cksum CRC is the only algorithm; the reflected CRC-32B variant is
/// deliberately not offered here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
enum Algorithm {
    /// POSIX cksum CRC (the default)
    #[default]
    Crc,
}

fn checksum_one(name: &str) -> Result<Checksum> {
    if name == "-" {
        checksum_reader(io::stdin().lock())
    } else {
        checksum_reader(File::open(name)?)
    }
}

fn write_result<W: Write>(out: &mut W, cli: &Cli, name: &str, sum: Checksum) -> io::Result<()> {
    if cli.raw {
        out.write_all(&sum.to_be_bytes())
    } else if cli.tag {
        writeln!(out, "CRC ({}) = {} {}", name, sum.crc, sum.length)
    } else if name == "-" {
        writeln!(out, "{} {}", sum.crc, sum.length)
    } else {
        writeln!(out, "{} {} {}", sum.crc, sum.length, name)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(shell) = cli.completion {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "oxisum", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    let files = if cli.files.is_empty() {
        vec!["-".to_string()]
    } else {
        cli.files.clone()
    };

    if cli.raw && files.len() > 1 {
        eprintln!("oxisum: the --raw option is not supported with multiple files");
        return ExitCode::FAILURE;
    }

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut failed = false;

    for name in &files {
        let sum = match checksum_one(name) {
            Ok(sum) => sum,
            Err(e) => {
                eprintln!("oxisum: {}: {}", name, e);
                failed = true;
                continue;
            }
        };

        let mut written = write_result(&mut out, &cli, name, sum);
        if written.is_ok() && cli.per_file_flush {
            written = out.flush();
        }
        if let Err(e) = written {
            if e.kind() == io::ErrorKind::BrokenPipe {
                return ExitCode::SUCCESS;
            }
            eprintln!("oxisum: write error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if let Err(e) = out.flush() {
        if e.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("oxisum: write error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
