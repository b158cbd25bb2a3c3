use crate::core::input::{InputError, InputProvider};
use std::io::{self, BufRead, Write};

/// Reads storefront intents from stdin.
pub struct TerminalInput;

impl InputProvider for TerminalInput {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError> {
        let mut out = io::stdout().lock();
        write!(out, "{prompt}")?;
        out.flush()?;

        let mut buf = String::new();
        if io::stdin().lock().read_line(&mut buf)? == 0 {
            return Err(InputError::Closed);
        }
        Ok(buf.trim_end_matches(['\n', '\r']).to_string())
    }
}
