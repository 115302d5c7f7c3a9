use std::io::{self, BufRead, Write};

use color_eyre::Result;

/// Ask a yes/no question on stderr and read the answer from stdin.
pub fn confirm(question: &str) -> Result<bool> {
    let stdin = io::stdin();
    confirm_with(question, &mut stdin.lock(), &mut io::stderr())
}

/// Anything other than `y`/`yes` (any case) is a no, including end of input.
pub fn confirm_with(
    question: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<bool> {
    write!(output, "{question} [y/N] ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
