use alexandria::cli::{handle_delete, handle_list, handle_serve, Cli, Commands};
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port, storage_dir } => handle_serve(port, storage_dir),
        Commands::List { storage_dir, json } => handle_list(storage_dir, json),
        Commands::Delete { name, storage_dir } => handle_delete(name, storage_dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
