//! `courtroom check`: evaluate a message text against a workspace snapshot.

use anyhow::{Context, Result};
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::services::{is_fixed, FixRule};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Message text, e.g. "fix alt in img1"
    pub text: String,

    /// Snapshot file to check; reads stdin when omitted
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,
}

#[derive(Debug, serde::Serialize)]
pub struct CheckOutput {
    pub text: String,
    pub rule: Option<String>,
    pub fixed: bool,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        let rule = self.rule.as_deref().unwrap_or("none");
        let verdict = if self.fixed { "fixed" } else { "not fixed" };
        format!("Rule: {rule}\nVerdict: {verdict}")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: CheckArgs, json_mode: bool) -> Result<()> {
    let snapshot = match &args.snapshot {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read snapshot from stdin")?;
            buffer
        }
    };

    let result = CheckOutput {
        rule: FixRule::for_text(&args.text).map(|rule| rule.as_str().to_string()),
        fixed: is_fixed(&args.text, &snapshot),
        text: args.text,
    };
    output(&result, json_mode);
    Ok(())
}
