/*
 * Writes the standard suite of synthetic E57 fixtures into a folder.
 *
 * The suite contains well-formed files and files that break the format on purpose,
 * for example with an invalid record count, an unsupported codec or a corrupted signature.
 * Use --list to see all fixture names and --only to write a subset.
 * With --verify every written file is read back and its layout is printed.
 */

use anyhow::{bail, Context, Result};
use clap::Parser;
use e57_fixtures::inspect;
use e57_fixtures::suite::{standard_suite, write_suite, NamedFixture};
use std::fs::{create_dir_all, read};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Folder for the generated files, will be created if missing.
    #[arg(short, long, default_value = "test_data")]
    output: PathBuf,

    /// Only write fixtures with these file names.
    #[arg(long)]
    only: Vec<String>,

    /// Print the available fixtures and exit.
    #[arg(long)]
    list: bool,

    /// Read back every written file and print its layout.
    #[arg(long)]
    verify: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let suite = standard_suite();
    if args.list {
        for named in &suite {
            println!("{:<40} {}", named.name, named.purpose);
        }
        return Ok(());
    }

    let selected: Vec<NamedFixture> = if args.only.is_empty() {
        suite
    } else {
        for name in &args.only {
            if !suite.iter().any(|f| f.name == name.as_str()) {
                bail!("Unknown fixture '{name}', use --list to see all fixtures");
            }
        }
        suite
            .into_iter()
            .filter(|f| args.only.iter().any(|n| n == f.name))
            .collect()
    };

    create_dir_all(&args.output).context("Failed to create output folder")?;
    let written = write_suite(&args.output, &selected).context("Failed to write fixtures")?;
    for (path, bytes) in &written {
        info!(path = %path.display(), bytes, "Created fixture");
    }

    if args.verify {
        for (path, _) in &written {
            let data = read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            match inspect(&data) {
                Ok(inspection) => {
                    let header = &inspection.header;
                    println!("{}", path.display());
                    println!(
                        "  Header: signature {:?}, length {}, XML {} bytes at {}",
                        String::from_utf8_lossy(&header.signature),
                        header.phys_length,
                        header.xml_length,
                        header.phys_xml_offset
                    );
                    for record in &inspection.records {
                        println!(
                            "  Point cloud {}: fileOffset {}, recordCount {}, prototype [{}], codecs {}",
                            record.guid.as_deref().unwrap_or("-"),
                            record.file_offset.as_deref().unwrap_or("-"),
                            record.record_count.as_deref().unwrap_or("-"),
                            record.prototype.join(", "),
                            record
                                .codecs
                                .as_ref()
                                .map(|c| format!("[{}]", c.join(", ")))
                                .unwrap_or_else(|| String::from("-"))
                        );
                    }
                }
                Err(err) => println!("{}\n  Not readable: {err}", path.display()),
            }
        }
    }

    println!("Wrote {} fixtures to {}", written.len(), args.output.display());
    Ok(())
}
