use std::fmt::Display;
use std::io;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    #[error("Input closed")]
    Closed,

    #[error("Parse failure: {0}")]
    Parse(String),
}

/// Source of user lines, so the storefront session can be scripted in tests.
pub trait InputProvider {
    fn read_line(&mut self, prompt: &str) -> Result<String, InputError>;
}

/// Prompting and conversion on top of an [`InputProvider`].
pub struct InputHandler<I: InputProvider> {
    provider: I,
}

impl<I: InputProvider> InputHandler<I> {
    pub fn new(provider: I) -> Self {
        Self { provider }
    }

    /// Raw line. Search text keeps its inner spacing.
    pub fn get_string(&mut self, prompt: &str) -> Result<String, InputError> {
        self.provider.read_line(prompt)
    }

    pub fn get_string_trimmed(&mut self, prompt: &str) -> Result<String, InputError> {
        self.get_string(prompt).map(|s| s.trim().to_string())
    }

    /// Parses trimmed input; for ids and menu numbers.
    pub fn parse_trimmed<T>(&mut self, prompt: &str) -> Result<T, InputError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let s = self.get_string_trimmed(prompt)?;
        s.parse::<T>().map_err(|e| InputError::Parse(e.to_string()))
    }

    /// 1-based choice from a list of `len` entries, returned as a 0-based index.
    pub fn pick(&mut self, prompt: &str, len: usize) -> Result<Option<usize>, InputError> {
        match self.parse_trimmed::<usize>(prompt) {
            Ok(v) if v >= 1 && v <= len => Ok(Some(v - 1)),
            Ok(_) | Err(InputError::Parse(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays scripted lines, then reports the input as closed.
    pub(crate) struct MockProvider {
        responses: VecDeque<String>,
    }

    impl MockProvider {
        pub(crate) fn new(lines: &[&str]) -> Self {
            Self {
                responses: lines.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    impl InputProvider for MockProvider {
        fn read_line(&mut self, _p: &str) -> Result<String, InputError> {
            self.responses.pop_front().ok_or(InputError::Closed)
        }
    }

    #[test]
    fn test_parse_trimmed_success() {
        let mut handler = InputHandler::new(MockProvider::new(&[" 42 "]));
        assert_eq!(handler.parse_trimmed::<u32>("test").unwrap(), 42);
    }

    #[test]
    fn test_get_string_keeps_spacing() {
        let mut handler = InputHandler::new(MockProvider::new(&["  dark side "]));
        assert_eq!(handler.get_string("q").unwrap(), "  dark side ");
    }

    #[test]
    fn test_pick_bounds() {
        let mut handler = InputHandler::new(MockProvider::new(&["2", "0", "4", "x"]));
        assert_eq!(handler.pick("#", 3).unwrap(), Some(1));
        assert_eq!(handler.pick("#", 3).unwrap(), None);
        assert_eq!(handler.pick("#", 3).unwrap(), None);
        assert_eq!(handler.pick("#", 3).unwrap(), None);
        assert!(matches!(handler.pick("#", 3), Err(InputError::Closed)));
    }

    #[test]
    fn test_trim_empty_input() {
        let mut handler = InputHandler::new(MockProvider::new(&["   "]));
        assert!(handler.get_string_trimmed("test").unwrap().is_empty());
    }
}
