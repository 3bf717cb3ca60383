use clap::{Parser, Subcommand};
use std::path::PathBuf;

use campus_jukebox::config::Config;
use campus_jukebox::hash::sha512_hex;
use campus_jukebox::serve::run_server;
use campus_jukebox::DynError;

#[derive(Parser, Debug)]
#[command(author, version, about = "Song-voting board for one email domain")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web server
    Serve {
        /// Path to config file (TOML format)
        #[arg(short, long)]
        config: PathBuf,

        /// Port to listen on (overrides config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the SHA-512 hex digest of an admin API token
    ///
    /// Put the digest into the config file as app.api_token_sha512.
    HashToken {
        /// The token to hash
        token: String,
    },
}

fn main() -> Result<(), DynError> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Command::Serve { config, port } => {
            let loaded = Config::load(&config)?;
            run_server(config, loaded, port)
        }
        Command::HashToken { token } => {
            println!("{}", sha512_hex(token.as_bytes()));
            Ok(())
        }
    }
}
