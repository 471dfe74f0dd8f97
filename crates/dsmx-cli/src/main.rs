mod classify_cmd;
mod cli;
mod extract_cmd;
mod page_range;
mod shared;
mod words_cmd;

use clap::Parser;
use cli::Cli;
use dsmx::ExtractOptions;

fn main() {
    let cli = Cli::parse();
    shared::init_logging(cli.verbose);

    let result = match cli.command {
        cli::Commands::Extract {
            ref file,
            ref pages,
            ref scan_pages,
            ref output,
            ref document,
            document_format,
            keep_margins,
            keep_tables,
            no_paragraph_gaps,
            top_margin,
            bottom_margin,
            min_repeat_ratio,
        } => {
            let mut options = ExtractOptions {
                remove_headers_footers: !keep_margins,
                ..ExtractOptions::default()
            };
            options.table.strip_from_flow = !keep_tables;
            if no_paragraph_gaps {
                options.paragraph_gap_ratio = None;
            }
            if let Some(top) = top_margin {
                options.margin.top_margin = top;
            }
            if let Some(bottom) = bottom_margin {
                options.margin.bottom_margin = bottom;
            }
            if let Some(ratio) = min_repeat_ratio {
                options.margin.min_repeat_ratio = ratio;
            }
            extract_cmd::run(
                file,
                pages.as_deref(),
                scan_pages.as_deref(),
                output.as_deref(),
                document.as_deref().map(|path| (path, document_format)),
                options,
            )
        }
        cli::Commands::Classify {
            ref file,
            ref pages,
            ref output,
            ref structured_dir,
            ref criteria,
            ref criteria_output,
            print_summary,
        } => classify_cmd::run(
            file,
            pages.as_deref(),
            output.as_deref(),
            structured_dir.as_deref(),
            criteria.as_deref(),
            criteria_output.as_deref(),
            print_summary,
        ),
        cli::Commands::Words {
            ref file,
            ref pages,
            ref format,
        } => words_cmd::run(file, pages.as_deref(), format),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
