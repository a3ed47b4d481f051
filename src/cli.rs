use clap::Parser;
use dirs;

#[derive(Parser, Debug)]
#[command(name = "mapleads")]
#[command(about = "A tool for harvesting business contact details from map search result pages")]
#[command(version)]
pub struct Cli {
    /// Create default configuration file at ./config/mapleads.toml
    #[arg(long, global = true)]
    pub init: bool,

    /// Search query, e.g. "web agency casablanca"
    #[arg(short, long)]
    pub query: Option<String>,

    /// Additional query variation to render and merge into the harvest
    /// (repeat the flag for several variations)
    #[arg(long, value_name = "QUERY")]
    pub variation: Vec<String>,

    /// Output format: 'csv' (default), 'json', 'markdown', or 'html'
    #[arg(short = 'f', long)]
    pub output_format: Option<String>,

    /// Output directory for results file (defaults to Desktop)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Output filename (extension will be set based on format if not provided)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Verbose logging (use -v for detailed steps, -vv for debug output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Run the browser with a visible window instead of headless
    #[arg(long)]
    pub no_headless: bool,

    /// Skip fetching candidate websites for email addresses
    /// (records are matched on domain names only)
    #[arg(long)]
    pub no_email_fetch: bool,

    /// Clear the cached website email lookups and exit
    #[arg(long)]
    pub clear_cache: bool,

    /// Export execution logs to a file (specify file path)
    #[arg(long)]
    pub log_file: Option<String>,

    /// Maximum scroll rounds on the results panel (overrides config)
    #[arg(long, value_name = "ROUNDS")]
    pub max_scroll_rounds: Option<u32>,

    /// Disable colored output (also respects NO_COLOR environment variable)
    #[arg(long)]
    pub no_color: bool,
}

// Keep Args as a plain struct so the pipeline does not depend on clap
#[derive(Debug)]
pub struct Args {
    pub init: bool,
    pub query: Option<String>,
    pub variation: Vec<String>,
    pub output_format: Option<String>,
    pub output_dir: Option<String>,
    pub output: Option<String>,
    pub verbose: u8,
    pub no_headless: bool,
    pub no_email_fetch: bool,
    pub clear_cache: bool,
    pub log_file: Option<String>,
    pub max_scroll_rounds: Option<u32>,
    pub no_color: bool,
}

impl From<&Cli> for Args {
    fn from(cli: &Cli) -> Self {
        Args {
            init: cli.init,
            query: cli.query.clone(),
            variation: cli.variation.clone(),
            output_format: cli.output_format.clone(),
            output_dir: cli.output_dir.clone(),
            output: cli.output.clone(),
            verbose: cli.verbose,
            no_headless: cli.no_headless,
            no_email_fetch: cli.no_email_fetch,
            clear_cache: cli.clear_cache,
            log_file: cli.log_file.clone(),
            max_scroll_rounds: cli.max_scroll_rounds,
            no_color: cli.no_color,
        }
    }
}

impl Args {
    pub fn validate(&self) -> Result<(), String> {
        // Query validation only applies to an actual harvest run
        if !self.init && !self.clear_cache {
            match &self.query {
                None => return Err("Search query is required (use --query)".to_string()),
                Some(q) if q.trim().is_empty() => {
                    return Err("Search query cannot be empty".to_string())
                }
                _ => {}
            }
        }

        if let Some(format) = &self.output_format {
            if !["csv", "json", "markdown", "html"].contains(&format.as_str()) {
                return Err(
                    "Output format must be 'csv', 'json', 'markdown', or 'html'".to_string(),
                );
            }
        }

        if let Some(rounds) = self.max_scroll_rounds {
            if rounds == 0 {
                return Err("Max scroll rounds must be greater than 0".to_string());
            }
        }

        if self.variation.iter().any(|v| v.trim().is_empty()) {
            return Err("Search variations cannot be empty".to_string());
        }

        Ok(())
    }

    pub fn get_default_output_dir() -> Result<String, String> {
        if let Some(desktop_dir) = dirs::desktop_dir() {
            Ok(desktop_dir.to_string_lossy().to_string())
        } else {
            // Fallback to current directory if Desktop can't be found
            Ok(".".to_string())
        }
    }

    pub fn get_output_dir(&self) -> Result<String, String> {
        match &self.output_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::get_default_output_dir(),
        }
    }
}
