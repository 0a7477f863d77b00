use std::io::{BufRead, Write};

use dashrev_history::ConfirmPrompt;

use crate::commands::Session;
use crate::error::{CliError, CliResult};

/// Restore `version` after confirmation
pub async fn run(session: &Session, version: u32, yes: bool) -> CliResult<()> {
    let controller = &session.controller;
    controller.reset_from_source().await?;
    session.ensure_loaded(version).await?;

    controller.request_restore(version).await?;
    let prompt = session
        .events
        .take_prompt()
        .ok_or_else(|| CliError::invalid_argument("restore was not confirmed"))?;

    if !yes && !ask(&prompt, std::io::stdin().lock(), std::io::stdout())? {
        controller.cancel_restore();
        println!("{}", session.style.info("Restore cancelled"));
        return Ok(());
    }

    controller.confirm(prompt.on_confirm).await?;
    Ok(())
}

/// Show the prompt and read a yes/no answer
fn ask(prompt: &ConfirmPrompt, mut input: impl BufRead, mut output: impl Write) -> CliResult<bool> {
    writeln!(output, "{}", prompt.title)?;
    writeln!(output, "{}", prompt.text2)?;
    write!(output, "{} [y/N] ", prompt.yes_text)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
