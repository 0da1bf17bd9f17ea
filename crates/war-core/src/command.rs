//! Command chain parsing.
//!
//! A [`CommandChain`] is the ordered list of external commands that runs each
//! time a watched path settles. Commands are parsed once at startup: each
//! string is split on whitespace into a program and its arguments. There is no
//! shell quoting, so `echo "a b"` runs `echo` with the two arguments `"a` and
//! `b"`.
//!
//! # Examples
//!
//! ```
//! use war_core::CommandChain;
//!
//! let chain = CommandChain::parse(["echo building", "make"]).unwrap();
//! assert_eq!(chain.len(), 2);
//! assert_eq!(chain.get(0).unwrap().program(), "echo");
//! assert_eq!(chain.get(0).unwrap().args(), ["building"]);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::ConfigError;

/// A single command: a program name plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The command line as given on the command line.
    line: String,

    /// The executable to launch.
    program: String,

    /// Arguments passed to the program.
    args: SmallVec<[String; 4]>,
}

impl CommandSpec {
    /// Parses a whitespace-delimited command line.
    ///
    /// Returns `None` if the line holds no program name.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let program = words.next()?.to_owned();
        let args = words.map(str::to_owned).collect();

        Some(Self {
            line: line.trim().to_owned(),
            program,
            args,
        })
    }

    /// Returns the program name.
    #[inline]
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the program arguments.
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the command line this spec was parsed from.
    #[inline]
    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

/// The ordered, immutable list of commands run on every trigger.
///
/// Execution stops at the first command that fails, so order matters: the
/// chain runs in the order the `-r` flags were given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CommandChain {
    commands: Vec<CommandSpec>,
}

impl CommandChain {
    /// Parses every command line into a chain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCommand`] if any line is blank.
    pub fn parse<I, S>(lines: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let commands = lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                CommandSpec::parse(line.as_ref()).ok_or(ConfigError::EmptyCommand { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { commands })
    }

    /// Returns the number of commands in the chain.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if the chain has no commands.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Returns the command at `index`, if any.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CommandSpec> {
        self.commands.get(index)
    }

    /// Returns an iterator over the commands in execution order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, CommandSpec> {
        self.commands.iter()
    }
}

impl<'a> IntoIterator for &'a CommandChain {
    type Item = &'a CommandSpec;
    type IntoIter = std::slice::Iter<'a, CommandSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}

impl TryFrom<Vec<String>> for CommandChain {
    type Error = ConfigError;

    fn try_from(lines: Vec<String>) -> Result<Self, Self::Error> {
        Self::parse(lines)
    }
}

impl From<CommandChain> for Vec<String> {
    fn from(chain: CommandChain) -> Self {
        chain.commands.into_iter().map(|spec| spec.line).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_program_and_args() {
        let spec = CommandSpec::parse("cargo build --release").unwrap();
        assert_eq!(spec.program(), "cargo");
        assert_eq!(spec.args(), ["build", "--release"]);
        assert_eq!(spec.line(), "cargo build --release");
    }

    #[test]
    fn test_parse_collapses_repeated_whitespace() {
        let spec = CommandSpec::parse("  echo   a\tb ").unwrap();
        assert_eq!(spec.program(), "echo");
        assert_eq!(spec.args(), ["a", "b"]);
        assert_eq!(spec.to_string(), "echo   a\tb");
    }

    #[test]
    fn test_parse_has_no_quoting() {
        let spec = CommandSpec::parse(r#"echo "a b""#).unwrap();
        assert_eq!(spec.args(), [r#""a"#, r#"b""#]);
    }

    #[test]
    fn test_parse_blank_line() {
        assert!(CommandSpec::parse("").is_none());
        assert!(CommandSpec::parse("   ").is_none());
    }

    #[test]
    fn test_chain_preserves_order() {
        let chain = CommandChain::parse(["echo A", "echo B", "make"]).unwrap();
        let programs: Vec<_> = chain.iter().map(CommandSpec::line).collect();
        assert_eq!(programs, vec!["echo A", "echo B", "make"]);
    }

    #[test]
    fn test_chain_rejects_blank_command() {
        let err = CommandChain::parse(["echo A", " "]).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyCommand { index: 1 }));
    }

    #[test]
    fn test_chain_serializes_as_command_lines() {
        let chain = CommandChain::parse(["echo A", "false"]).unwrap();
        let json = serde_json::to_string(&chain).unwrap();
        assert_eq!(json, r#"["echo A","false"]"#);

        let blank: Result<CommandChain, _> = serde_json::from_str(r#"["echo A", ""]"#);
        assert!(blank.is_err());
    }
}
