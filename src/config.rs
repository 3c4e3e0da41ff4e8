use clap::Parser;

#[derive(Clone, Debug, Parser)]
#[command(name = "stringlens")]
#[command(about = "Analyze strings and query them with plain English", long_about = None)]
#[command(version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "STRINGLENS_BIND", default_value = "127.0.0.1:8000")]
    pub bind: String,

    /// Database to persist strings in. Without it, strings are kept in memory.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Origins allowed to call the API from a browser. Without any, every origin is allowed.
    #[arg(long = "cors-origin", env = "STRINGLENS_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log only warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Config {
    pub fn log_level(&self) -> Option<log::LevelFilter> {
        if self.quiet {
            Some(log::LevelFilter::Warn)
        } else if self.verbose {
            Some(log::LevelFilter::Debug)
        } else {
            None
        }
    }
}
