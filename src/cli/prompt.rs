// Interactive prompts

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Ask a yes/no question. Anything other than y/yes (including EOF) is a no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<bool> {
    write!(out, "{} (y/n): ", question)?;
    out.flush().context("Failed to flush prompt")?;

    let mut answer = String::new();
    input.read_line(&mut answer).context("Failed to read input")?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Ask for replacement text. An empty reply or EOF is a cancellation.
pub fn prompt_text<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
    current: &str,
) -> Result<Option<String>> {
    write!(out, "{} [{}]: ", label, current)?;
    out.flush().context("Failed to flush prompt")?;

    let mut reply = String::new();
    let read = input.read_line(&mut reply).context("Failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    let reply = reply.trim_end_matches(['\n', '\r']);
    if reply.is_empty() {
        Ok(None)
    } else {
        Ok(Some(reply.to_string()))
    }
}
