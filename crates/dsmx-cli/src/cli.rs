use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

/// Rebuild reading-order text and DSM-5 classification data from word dumps.
#[derive(Debug, Parser)]
#[command(name = "dsmx", about, version)]
pub struct Cli {
    /// Log progress details to stderr (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract clean page text, margins and tables as JSON
    Extract {
        /// Path to the word dump (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pages to extract (e.g. '10-49'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Pages scanned for repeating headers/footers. Default: the extracted pages
        #[arg(long)]
        scan_pages: Option<String>,

        /// Write the JSON here instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Also write a formatted document to this path
        #[arg(long, value_name = "PATH")]
        document: Option<PathBuf>,

        /// Format of the --document output
        #[arg(long, value_enum, default_value_t = DocumentFormat::Text)]
        document_format: DocumentFormat,

        /// Keep repeating headers/footers and page numbers in the text
        #[arg(long)]
        keep_margins: bool,

        /// Leave table content in the text flow
        #[arg(long)]
        keep_tables: bool,

        /// Do not insert paragraph breaks at large vertical gaps
        #[arg(long)]
        no_paragraph_gaps: bool,

        /// Header band height in points from the page top. Default: 70
        #[arg(long, value_name = "PT")]
        top_margin: Option<f64>,

        /// Footer band height in points from the page bottom. Default: 70
        #[arg(long, value_name = "PT")]
        bottom_margin: Option<f64>,

        /// Share of scanned pages a margin text must repeat on to be removed. Default: 0.6
        #[arg(long, value_name = "RATIO")]
        min_repeat_ratio: Option<f64>,
    },

    /// Parse the classification listing into a family/group/disorder hierarchy
    Classify {
        /// Path to the word dump (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pages holding the classification listing. Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Write the hierarchy JSON here instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Also write families/groups/disorders/specifiers JSON files to this directory
        #[arg(long, value_name = "DIR")]
        structured_dir: Option<PathBuf>,

        /// Criteria extraction jobs (JSON list)
        #[arg(long, value_name = "PATH")]
        criteria: Option<PathBuf>,

        /// Write the extracted criteria JSON to this path
        #[arg(long, value_name = "PATH", requires = "criteria")]
        criteria_output: Option<PathBuf>,

        /// Print one summary line per family
        #[arg(long)]
        print_summary: bool,
    },

    /// Show the clustered lines of each page in reading order
    Words {
        /// Path to the word dump (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Format of the formatted document written by `extract --document`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DocumentFormat {
    /// Plain text with criteria and list breaks
    Text,
    /// GitHub Flavored Markdown
    Markdown,
}

/// Output format for the words subcommand.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Plain text (tab-separated)
    Text,
    /// JSON output
    Json,
}
