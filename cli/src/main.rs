//! saenggibu CLI - transcript record extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use saenggibu::{
    load_pages, DedupPolicy, ExtractOptions, ExtractionReport, MemorySource, PageClassifier,
    PageDomain, Pipeline, StudentInfoExtractor,
};

#[derive(Parser)]
#[command(name = "saenggibu")]
#[command(version)]
#[command(about = "Extract structured student records from transcript page dumps", long_about = None)]
struct Cli {
    /// Input page-dump JSON file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Pretty-print the report JSON
    #[arg(long)]
    pretty: bool,

    /// Raise the log level (repeat for debug output)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract reports from one or more page-dump files
    Extract {
        /// Input page-dump JSON files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output file, or directory for multiple inputs (stdout if not specified)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Pretty-print the report JSON
        #[arg(long)]
        pretty: bool,

        /// Scan at most this many pages per document
        #[arg(long, value_name = "N", env = "SAENGGIBU_MAX_PAGES")]
        max_pages: Option<usize>,

        /// Merge duplicate attendance records instead of keeping the first
        #[arg(long)]
        merge_attendance: bool,

        /// Skip the full-text section scans
        #[arg(long)]
        skip_sections: bool,
    },

    /// Show page count and per-page domain classification
    Info {
        /// Input page-dump JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show extracted student identity fields
    Student {
        /// Input page-dump JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Extract {
            inputs,
            output,
            pretty,
            max_pages,
            merge_attendance,
            skip_sections,
        }) => {
            let options = build_options(max_pages, merge_attendance, skip_sections);
            cmd_extract(&inputs, output.as_deref(), pretty, options)
        }
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Student { input }) => cmd_student(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: extract if input is provided
            if let Some(input) = cli.input {
                cmd_extract(
                    &[input],
                    cli.output.as_deref(),
                    cli.pretty,
                    ExtractOptions::new(),
                )
            } else {
                println!("{}", "Usage: saenggibu <FILE> [OUTPUT]".yellow());
                println!("       saenggibu --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn build_options(
    max_pages: Option<usize>,
    merge_attendance: bool,
    skip_sections: bool,
) -> ExtractOptions {
    let dedup = if merge_attendance {
        DedupPolicy::Merge
    } else {
        DedupPolicy::FirstWins
    };
    let mut options = ExtractOptions::new()
        .with_attendance_dedup(dedup)
        .with_skip_sections(skip_sections);
    if let Some(limit) = max_pages {
        options = options.with_max_pages(limit);
    }
    options
}

fn cmd_extract(
    inputs: &[PathBuf],
    output: Option<&Path>,
    pretty: bool,
    options: ExtractOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::with_options(options);

    if let [input] = inputs {
        let report = run_one(&pipeline, input)?;
        let json = render_report(&report, pretty)?;

        match output {
            Some(path) => {
                fs::write(path, json)?;
                println!("{} {}", "Saved to".green(), path.display());
                print_breakdown(&report);
            }
            None => println!("{}", json),
        }
        return Ok(());
    }

    // Multiple inputs: one report file per document in a directory
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut failures = 0usize;
    for input in inputs {
        pb.set_message(
            input
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned(),
        );

        match run_one(&pipeline, input) {
            Ok(report) => {
                let stem = input.file_stem().unwrap_or_default().to_string_lossy();
                let path = output_dir.join(format!("{}_report.json", stem));
                fs::write(&path, render_report(&report, pretty)?)?;
                pb.suspend(|| print_summary(input, &report));
            }
            Err(e) => {
                failures += 1;
                pb.suspend(|| {
                    eprintln!("{} {}: {}", "✗".red().bold(), input.display(), e);
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "\n{} {} of {} documents extracted",
        "Done!".green().bold(),
        inputs.len() - failures,
        inputs.len()
    );

    if failures > 0 {
        return Err(format!("{} of {} documents failed", failures, inputs.len()).into());
    }
    Ok(())
}

fn run_one(
    pipeline: &Pipeline,
    input: &Path,
) -> Result<ExtractionReport, Box<dyn std::error::Error>> {
    let source = MemorySource::from_json_file(input)?;
    Ok(pipeline.extract(&source))
}

fn render_report(
    report: &ExtractionReport,
    pretty: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    let json = if pretty {
        report.to_json_pretty()?
    } else {
        report.to_json()?
    };
    Ok(json)
}

fn print_summary(input: &Path, report: &ExtractionReport) {
    println!(
        "{} {}: {} records from {} pages ({:.2}s)",
        "✓".green().bold(),
        input.display(),
        report.total_records(),
        report.stats.pages_scanned,
        report.processing_time
    );
}

fn print_breakdown(report: &ExtractionReport) {
    let sections = report.school_history.len()
        + report.creative_activities.len()
        + report.behavioral_records.len();

    println!("\n{}", "Extraction summary:".green().bold());
    println!(
        "  {} student: {}",
        "├─".dimmed(),
        report.student_info.name_or_unknown()
    );
    println!("  {} grades: {}", "├─".dimmed(), report.stats.grade_records);
    println!(
        "  {} attendance: {}",
        "├─".dimmed(),
        report.stats.attendance_records
    );
    println!(
        "  {} details: {}",
        "├─".dimmed(),
        report.stats.detail_records
    );
    println!("  {} sections: {}", "└─".dimmed(), sections);
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = MemorySource::from_json_file(input)?;
    let pages = load_pages(&source);
    let classifier = PageClassifier::new();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), pages.len());

    println!();
    println!("{}", "Page Domains".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!(
        "{}",
        format!("{:>5}  {:<14}  {:>6}  {:>6}", "Page", "Domain", "Chars", "Tables").bold()
    );

    let mut counts = vec![0usize; PageDomain::ALL.len() + 1];
    for page in &pages {
        let domain = classifier.classify(&page.text);
        let slot = PageDomain::ALL
            .iter()
            .position(|d| *d == domain)
            .unwrap_or(PageDomain::ALL.len());
        counts[slot] += 1;

        println!(
            "{:>5}  {:<14}  {:>6}  {:>6}",
            page.number,
            domain.as_str(),
            page.text.chars().count(),
            page.tables.len()
        );
    }

    println!();
    println!("{}", "Domain Counts".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (slot, count) in counts.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        let name = PageDomain::ALL
            .get(slot)
            .map(|d| d.as_str())
            .unwrap_or(PageDomain::Unknown.as_str());
        println!("{}: {}", name.bold(), count);
    }

    Ok(())
}

fn cmd_student(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = MemorySource::from_json_file(input)?;
    let pages = load_pages(&source);
    let front: String = pages
        .iter()
        .take(2)
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let info = StudentInfoExtractor::new().extract(&front);

    println!("{}", "Student Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    print_field("Name", info.name.as_deref());
    let birth = info.birth_date.map(|date| date.to_string());
    print_field("Birth date", birth.as_deref());
    print_field("Gender", info.gender.as_deref());
    print_field("School", info.school.as_deref());

    Ok(())
}

fn print_field(label: &str, value: Option<&str>) {
    match value {
        Some(value) => println!("{}: {}", label.bold(), value),
        None => println!("{}: {}", label.bold(), "-".dimmed()),
    }
}

fn cmd_version() {
    println!(
        "{} {}",
        "saenggibu".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Student transcript record extraction tool");
    println!();
    println!("License: MIT");
}
