//! Command-line interface.

pub mod actor;
pub mod commands;
pub mod output;
pub mod table;
pub mod types;

pub use actor::ActorCommand;
pub use types::{Cli, Commands};

/// Print a command error and exit with a failure status.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let body = serde_json::json!({
            "error": err.to_string(),
            "causes": err.chain().skip(1).map(|c| c.to_string()).collect::<Vec<_>>(),
        });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
