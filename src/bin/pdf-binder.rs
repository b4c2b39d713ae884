//! PDF Binder CLI tool
//!
//! Merges the PDFs in a directory into one document with a title page, a
//! table of contents and bookmarks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use pdf_binder::date::TitleDate;
use pdf_binder::discover::DEFAULT_OUTPUT_NAME;
use pdf_binder::pdf::count_pages;
use pdf_binder::{logging, merge_directory, MergeOptions};

/// PDF Binder - Merge a directory of PDFs with a table of contents
#[derive(Parser)]
#[command(name = "pdf-binder")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge every PDF in ./handouts into handouts/merged_pdfs.pdf
    pdf-binder merge --directory handouts

    # Choose the output name and title, with a separator page per document
    pdf-binder merge -d handouts -n spring.pdf --title \"Spring Term\" --separators

    # Count the pages of a PDF
    pdf-binder info handouts/merged_pdfs.pdf")]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge all PDFs in a directory into one document
    Merge {
        /// Directory containing the PDF files
        #[arg(short, long)]
        directory: PathBuf,

        /// Output file name, created inside the directory
        #[arg(short, long, default_value = DEFAULT_OUTPUT_NAME)]
        name: String,

        /// Title page heading (defaults to the directory name)
        #[arg(long)]
        title: Option<String>,

        /// Date on the title page: "today", "none", "2026-01-14" or "01/14/2026"
        #[arg(long, default_value = "today")]
        date: String,

        /// Insert a page naming each document before it
        #[arg(long)]
        separators: bool,

        /// Do not stamp "Page N of M" footers
        #[arg(long)]
        no_page_numbers: bool,
    },

    /// Show the page count of a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.quiet) {
        eprintln!("Warning: {}", e);
    }

    let result = match cli.command {
        Commands::Merge {
            directory, name, title, date, separators, no_page_numbers,
        } => cmd_merge(directory, name, title, date, separators, no_page_numbers),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Merge a directory of PDFs
fn cmd_merge(
    directory: PathBuf,
    name: String,
    title: Option<String>,
    date: String,
    separators: bool,
    no_page_numbers: bool,
) -> Result<()> {
    let date = TitleDate::parse(&date)?;

    let options = MergeOptions {
        directory: directory.clone(),
        output_name: name,
        title,
        date,
        separators,
        page_numbers: !no_page_numbers,
        ..Default::default()
    };

    let report = merge_directory(&options)
        .with_context(|| format!("Failed to merge PDFs in {}", directory.display()))?;

    for path in &report.skipped {
        eprintln!("Skipped: {}", path.display());
    }
    println!("{}", report.output_path.display());
    println!(
        "{} documents, {} table of contents page(s), {} pages total",
        report.entries.len(),
        report.toc_pages,
        report.total_pages
    );

    Ok(())
}

/// Print the page count of a PDF
fn cmd_info(input: PathBuf) -> Result<()> {
    let pages = count_pages(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("File: {}", input.display());
    println!("Pages: {}", pages);

    Ok(())
}
