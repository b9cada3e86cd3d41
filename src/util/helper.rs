// src/util/helper.rs
use std::io::{self, BufRead, IsTerminal, Write};

/// Interactive confirmation prompt, reading one line from `input`
pub fn confirm_from<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    write!(output, "{} (y/N): ", prompt)?;
    output.flush()?; // Ensure the prompt is displayed immediately

    let mut user_input = String::new();
    input.read_line(&mut user_input)?;

    Ok(matches!(
        user_input.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Interactive confirmation prompt on the terminal
pub fn confirm(prompt: &str) -> io::Result<bool> {
    confirm_from(prompt, &mut io::stdin().lock(), &mut io::stdout())
}

pub fn is_stderr_piped() -> bool {
    !io::stderr().is_terminal()
}
