//! Line based questions with an explicit set of accepted answers.
//!
//! Every question is a tiny state machine: write the question, read one line,
//! then either accept it as a [`Choice`] or ask again as allowed by the
//! [`RetryPolicy`]. Rejected lines have no effect besides the repeated question.

use core::num::NonZeroUsize;
use std::io::{self, BufRead, Write};

use crate::user_output;

/// A typed answer to a question.
pub trait Choice: Sized {
    /// Answers shown to the user, e.g. `["2019", "2022"]`.
    const TOKENS: &'static [&'static str];

    /// Parses a line without its terminator. [`None`] rejects the line.
    fn parse(line: &str) -> Option<Self>;
}

/// Answer to a yes/no question.
///
/// Anything other than `y` or `Y` means "no", so no line is ever rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::exhaustive_enums, reason = "yes or no")]
pub enum Confirmation {
    /// The user answered `y`.
    Yes,
    /// The user answered anything else.
    No,
}

impl Choice for Confirmation {
    const TOKENS: &'static [&'static str] = &["Y", "N"];

    #[inline]
    fn parse(line: &str) -> Option<Self> {
        if line.eq_ignore_ascii_case("y") {
            Some(Self::Yes)
        } else {
            Some(Self::No)
        }
    }
}

/// How many times a question is asked before giving up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum RetryPolicy {
    /// Ask until an answer is accepted or the input ends.
    #[default]
    Unbounded,
    /// Ask at most this many times.
    Attempts(NonZeroUsize),
}

impl RetryPolicy {
    /// Whether another question may follow `asked` rejected answers.
    #[inline]
    #[must_use]
    pub const fn allows(self, asked: usize) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Attempts(max) => asked < max.get(),
        }
    }
}

/// Asks `question` on `writer` and reads lines from `reader` until one parses
/// as `T`.
///
/// Only the line terminator is stripped before parsing, so surrounding
/// whitespace makes an answer different. Invalid UTF-8 is replaced with
/// `U+FFFD`, so such a line is just another answer to parse.
///
/// # Errors
///
/// Returns an error if reading or writing fails, the input ends,
/// or the [`RetryPolicy`] runs out.
#[inline]
pub fn ask<T, R, W>(
    question: &str,
    mut reader: R,
    mut writer: W,
    policy: RetryPolicy,
) -> Result<T, PromptError>
where
    T: Choice,
    R: BufRead,
    W: Write,
{
    let mut asked = 0;
    let mut line = Vec::new();
    loop {
        user_output!(&mut writer, "{question}").map_err(PromptError::Write)?;
        asked += 1;

        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(PromptError::Read)?;
        if read == 0 {
            return Err(PromptError::Closed);
        }
        let text = String::from_utf8_lossy(&line);
        let answer = strip_line_terminator(&text);
        if let Some(choice) = T::parse(answer) {
            return Ok(choice);
        }
        log::debug!("rejected answer {answer:?}, expected one of {:?}", T::TOKENS);

        if !policy.allows(asked) {
            return Err(PromptError::RetriesExhausted { attempts: asked });
        }
    }
}

/// Removes a trailing `\n` or `\r\n`.
fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// An error indicating that a question got no acceptable answer.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PromptError {
    /// An I/O error occurred while reading user input.
    #[error("failed to read user input: {0}")]
    Read(#[source] io::Error),
    /// An I/O error occurred while writing the question.
    #[error("failed to write user output: {0}")]
    Write(#[source] io::Error),
    /// Input ended before an answer was accepted.
    #[error("input closed before an answer was given")]
    Closed,
    /// Every allowed attempt was rejected.
    #[error("no valid answer after {attempts} attempts")]
    RetriesExhausted {
        /// Number of questions asked.
        attempts: usize,
    },
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Digit(u8);

    impl Choice for Digit {
        const TOKENS: &'static [&'static str] = &["0", "1"];

        fn parse(line: &str) -> Option<Self> {
            match line {
                "0" => Some(Self(0)),
                "1" => Some(Self(1)),
                _ => None,
            }
        }
    }

    #[test_log::test]
    fn confirmation_is_case_insensitive_y() {
        for yes in ["y", "Y"] {
            assert_eq!(Confirmation::parse(yes), Some(Confirmation::Yes));
        }
        for no in ["n", "N", "", "yes", " y", "y ", "1", "\u{443}"] {
            assert_eq!(Confirmation::parse(no), Some(Confirmation::No), "{no:?}");
        }
    }

    #[test_log::test]
    fn reasks_until_accepted() {
        let input = Cursor::new("2\nfoo\n\n1\n0\n");
        let mut output = Vec::new();
        let answer = ask::<Digit, _, _>("digit? ", input, &mut output, RetryPolicy::Unbounded)
            .unwrap();
        assert_eq!(answer, Digit(1));
        assert_eq!(String::from_utf8(output).unwrap(), "digit? ".repeat(4));
    }

    #[test_log::test]
    fn windows_line_endings_are_stripped() {
        let answer = ask::<Confirmation, _, _>(
            "ok? ",
            Cursor::new("Y\r\n"),
            io::sink(),
            RetryPolicy::default(),
        )
        .unwrap();
        assert_eq!(answer, Confirmation::Yes);
    }

    #[test_log::test]
    fn last_line_without_terminator() {
        let answer =
            ask::<Digit, _, _>("? ", Cursor::new("0"), io::sink(), RetryPolicy::default())
                .unwrap();
        assert_eq!(answer, Digit(0));
    }

    #[test_log::test]
    fn closed_input_is_an_error() {
        let err = ask::<Digit, _, _>("? ", Cursor::new("7\n"), io::sink(), RetryPolicy::default())
            .unwrap_err();
        assert!(matches!(err, PromptError::Closed));
    }

    #[test_log::test]
    fn invalid_utf8_is_an_ordinary_answer() {
        let mut output = Vec::new();
        let answer = ask::<Digit, _, _>(
            "? ",
            Cursor::new(b"\xff\xfe1\n0\n".as_slice()),
            &mut output,
            RetryPolicy::default(),
        )
        .unwrap();
        assert_eq!(answer, Digit(0));
        assert_eq!(output, b"? ? ");

        let answer = ask::<Confirmation, _, _>(
            "ok? ",
            Cursor::new(b"\xff\n".as_slice()),
            io::sink(),
            RetryPolicy::default(),
        )
        .unwrap();
        assert_eq!(answer, Confirmation::No);
    }

    #[test_log::test]
    fn limited_attempts() {
        let policy = RetryPolicy::Attempts(NonZeroUsize::new(2).unwrap());
        let err = ask::<Digit, _, _>("? ", Cursor::new("a\nb\n1\n"), io::sink(), policy)
            .unwrap_err();
        assert!(matches!(err, PromptError::RetriesExhausted { attempts: 2 }));
    }
}
