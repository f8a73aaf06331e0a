use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "hs-host")]
#[command(about = "Run and supervise an embedded HTTP server from the terminal")]
#[command(version)]
pub struct Cli {
    /// Config directory (defaults to $HS_CONFIG_DIR, else ./.hs)
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Port used by `start` when none is given (overrides server.port)
    #[arg(long)]
    pub port: Option<u16>,

    /// Start the server right away
    #[arg(long)]
    pub start: bool,
}
