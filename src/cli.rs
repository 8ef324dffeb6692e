use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "ghdash",
    version,
    about = "Terminal dashboard for a GitHub repository's issues and README"
)]
pub struct Args {
    /// Repository to browse, as OWNER/NAME (e.g. "ratatui/ratatui")
    pub repo: String,

    /// GitHub API token; falls back to the GITHUB_TOKEN environment variable
    #[arg(short, long)]
    pub token: Option<String>,
}
