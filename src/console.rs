//! Operator prompts
//!
//! [`Console`] wraps any line reader and writer so the wizards can be driven by
//! a terminal or by scripted input in tests. Every prompt repeats until the
//! answer is acceptable; end of input surfaces as [`Error::InputClosed`].

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt::Display;
use std::io::{BufRead, Stdin, Stdout, Write};

/// Prompt shown when asking for a menu choice
pub const SELECTION_PROMPT: &str = "Selection: ";

/// Console over stdin/stdout
pub type StdConsole = Console<std::io::StdinLock<'static>, Stdout>;

/// Line-oriented prompt helper
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl StdConsole {
    /// Console reading the process's stdin and writing its stdout
    pub fn stdio() -> Self {
        let stdin: Stdin = std::io::stdin();
        Console::new(stdin.lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Create a console over the given reader and writer
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the console, returning the writer
    pub fn into_output(self) -> W {
        self.output
    }

    /// Print one line
    pub fn say(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }

    /// Print a section header
    pub fn header(&mut self, title: &str) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "== {title} ==")?;
        Ok(())
    }

    /// Print `prompt` and read one line, without its line ending
    pub fn read_line(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::InputClosed);
        }
        while line.ends_with(&['\n', '\r'][..]) {
            line.pop();
        }
        Ok(line)
    }

    /// Read a whitespace-trimmed answer
    pub fn ask(&mut self, prompt: &str) -> Result<String> {
        Ok(self.read_line(prompt)?.trim().to_string())
    }

    /// Read an answer of at least `min_len` characters
    pub fn ask_min_len(&mut self, prompt: &str, min_len: usize) -> Result<String> {
        loop {
            let answer = self.ask(prompt)?;
            if answer.chars().count() >= min_len {
                return Ok(answer);
            }
            self.say(format_args!(
                "The input has to be at least {min_len} characters long. Retrying."
            ))?;
        }
    }

    /// Read an integer within `min..=max`
    pub fn choose(&mut self, min: u32, max: u32) -> Result<u32> {
        loop {
            let answer = self.ask(SELECTION_PROMPT)?;
            match answer.parse::<u32>() {
                Ok(n) if (min..=max).contains(&n) => return Ok(n),
                Ok(_) => self.say(format_args!(
                    "Input was not within the limits ({min} <= value <= {max}), repeat."
                ))?,
                Err(_) => self.say("Input was not a natural number, repeat.")?,
            }
        }
    }

    /// Print numbered options and read a choice among them
    ///
    /// Options are numbered from 1 in the given order.
    pub fn menu(&mut self, options: &[&str]) -> Result<u32> {
        for (i, option) in options.iter().enumerate() {
            self.say(format_args!("{} - {}", i + 1, option))?;
        }
        let max = u32::try_from(options.len()).unwrap_or(u32::MAX);
        self.choose(1, max)
    }

    /// Read a valid regular expression
    ///
    /// An empty answer reuses `default` when one is given. Without a default it
    /// stands for the empty pattern, which matches everything.
    pub fn ask_regex(&mut self, prompt: &str, default: &str) -> Result<Regex> {
        loop {
            let shown = if default.is_empty() {
                prompt.to_string()
            } else {
                format!("{prompt}[{default}] ")
            };
            let answer = self.read_line(&shown)?;
            let pattern = if answer.is_empty() { default } else { &answer };
            match Regex::new(pattern) {
                Ok(regex) => return Ok(regex),
                Err(e) => {
                    self.say(format_args!("Pattern seems to be malformed ({e}), try again:"))?
                }
            }
        }
    }

    /// Wait for ENTER
    pub fn pause(&mut self, message: &str) -> Result<()> {
        self.read_line(message).map(|_| ())
    }

    /// List `items` numbered from 0, pausing after every `batch` entries
    pub fn list_paged<T: Display>(&mut self, items: &[T], batch: usize) -> Result<()> {
        let batch = batch.max(1);
        for (i, item) in items.iter().enumerate() {
            self.say(format_args!("{i} - {item}"))?;
            let listed = i + 1;
            if listed % batch == 0 && listed < items.len() {
                self.pause(&format!(
                    "Haltpoint - More entries ({}) to come, press ENTER",
                    items.len() - listed
                ))?;
            }
        }
        Ok(())
    }
}
