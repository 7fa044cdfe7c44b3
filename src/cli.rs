//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Export a Confluence page, folder, or space tree to PDF files.
///
/// Confex discovers every page below the given root, mirrors the source
/// hierarchy under the output directory, and writes one PDF per page with
/// the page's attachments saved alongside it. Credentials are read from
/// `CONFLUENCE_USERNAME` and `CONFLUENCE_API_TOKEN` (a `.env` file in the
/// working directory is honored).
#[derive(Parser, Debug)]
#[command(name = "confex")]
#[command(author, version, about)]
pub struct Args {
    /// Root to export: a Confluence page/folder/space URL, a bare page
    /// id, or a space key (bare identifiers additionally need
    /// CONFLUENCE_BASE_URL)
    pub root: String,

    /// Directory the exported tree is written under
    #[arg(short = 'o', long, default_value = "output")]
    pub output: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable the interactive progress bar
    #[arg(long)]
    pub no_progress: bool,
}
