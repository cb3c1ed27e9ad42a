//! Token expansion over raw config text.
//!
//! Responsibilities:
//! - Scan raw text for `$name` / `${name}` placeholders and substitute each
//!   before JSON decoding.
//! - Route `${shell ...}` tokens to a shell, JSON-escaping the captured
//!   output so it is safe inside a JSON string literal.
//!
//! Does NOT handle:
//! - JSON decoding or the unescape walk (see `loader.rs` / `walk.rs`).
//!
//! Invariants:
//! - Tokens are expanded left-to-right, non-recursively; substituted values
//!   are never re-scanned.
//! - Shell output has exactly one trailing newline stripped, then is
//!   JSON-escaped at substitution time. Environment values are substituted
//!   verbatim, empty if unset.
//! - In lenient mode a failing shell token degrades to inline diagnostic
//!   text; strict mode turns it into a hard error.

use anyhow::Context;

use crate::constants::{SHELL_PROGRAM, SHELL_TOKEN_PREFIX};
use crate::error::ConfigError;
use crate::escape::json_escape;

/// Ambient environment and shell access, injectable for tests.
pub trait Environment {
    /// Look up an environment variable. `None` means unset.
    fn lookup(&self, name: &str) -> Option<String>;

    /// Execute a command line in a shell and capture standard output.
    ///
    /// Non-zero exit and spawn failures are both errors.
    fn execute(&self, command: &str) -> anyhow::Result<String>;
}

/// Process environment and `/bin/sh`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn execute(&self, command: &str) -> anyhow::Result<String> {
        let output = std::process::Command::new(SHELL_PROGRAM)
            .arg("-c")
            .arg(command)
            .output()
            .with_context(|| format!("failed to spawn {SHELL_PROGRAM}"))?;
        if !output.status.success() {
            anyhow::bail!(
                "shell exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// How expansion treats a failing `${shell ...}` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpandMode {
    /// Embed a `<token>: <error>` diagnostic and keep going, so
    /// partially-invalid config files still parse for debugging.
    #[default]
    Lenient,
    /// Abort the parse with [`ConfigError::ShellCommand`].
    Strict,
}

/// Expand every placeholder token in `src`.
///
/// Scanning follows the shell placeholder convention: `$name` for
/// alphanumeric names, `${name}` for arbitrary token text, single-character
/// special names (`$$`, `$?`, digits, ...). A lone `$` passes through
/// literally; `${}` and an unterminated `${` are consumed silently.
pub fn expand(src: &str, env: &dyn Environment, mode: ExpandMode) -> Result<String, ConfigError> {
    let bytes = src.as_bytes();
    let mut out = String::with_capacity(src.len());
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && i + 1 < bytes.len() {
            out.push_str(&src[copied..i]);
            let (name, width) = shell_name(&src[i + 1..]);
            if name.is_empty() && width > 0 {
                // Bad syntax such as "${}"; consumed without output.
            } else if name.is_empty() {
                out.push('$');
            } else {
                out.push_str(&expand_token(name, env, mode)?);
            }
            i += 1 + width;
            copied = i;
        } else {
            i += 1;
        }
    }
    out.push_str(&src[copied..]);
    Ok(out)
}

/// Substitute a single token.
fn expand_token(token: &str, env: &dyn Environment, mode: ExpandMode) -> Result<String, ConfigError> {
    let Some(command) = token.strip_prefix(SHELL_TOKEN_PREFIX) else {
        return Ok(env.lookup(token).unwrap_or_default());
    };

    if command.is_empty() {
        if mode == ExpandMode::Strict {
            return Err(ConfigError::ShellCommand {
                token: token.to_string(),
                message: "missing args".to_string(),
            });
        }
        tracing::warn!(token, "shell token has no command, embedding diagnostic");
        return Ok(format!("{token}: missing args"));
    }

    match env.execute(command) {
        Ok(raw) => {
            let trimmed = raw.strip_suffix('\n').unwrap_or(&raw);
            Ok(json_escape(trimmed))
        }
        Err(e) => match mode {
            ExpandMode::Strict => Err(ConfigError::ShellCommand {
                token: token.to_string(),
                message: e.to_string(),
            }),
            ExpandMode::Lenient => {
                tracing::warn!(token, error = %e, "shell expansion failed, embedding diagnostic");
                Ok(format!("{token}: {e}"))
            }
        },
    }
}

/// Extract the token name starting at `s` (the text after a `$`).
///
/// Returns the name and the number of bytes consumed. An empty name with a
/// non-zero width means bad syntax that should be consumed silently; an
/// empty name with zero width means the `$` was literal.
fn shell_name(s: &str) -> (&str, usize) {
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return ("", 0);
    }
    if bytes[0] == b'{' {
        if bytes.len() > 2 && is_special_var(bytes[1]) && bytes[2] == b'}' {
            return (&s[1..2], 3);
        }
        for i in 1..bytes.len() {
            if bytes[i] == b'}' {
                if i == 1 {
                    // "${}": bad syntax, eat it.
                    return ("", 2);
                }
                return (&s[1..i], i + 1);
            }
        }
        // Unterminated "${": bad syntax, eat the brace.
        return ("", 1);
    }
    if is_special_var(bytes[0]) {
        return (&s[..1], 1);
    }
    let mut i = 0;
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    (&s[..i], i)
}

fn is_special_var(c: u8) -> bool {
    matches!(c, b'*' | b'#' | b'$' | b'@' | b'!' | b'?' | b'-') || c.is_ascii_digit()
}

fn is_name_byte(c: u8) -> bool {
    c == b'_' || c.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEnvironment;

    fn lenient(src: &str, env: &FakeEnvironment) -> String {
        expand(src, env, ExpandMode::Lenient).unwrap()
    }

    #[test]
    fn test_braced_and_bare_names() {
        let env = FakeEnvironment::new().with_var("HOST", "localhost");
        assert_eq!(lenient("addr=${HOST}", &env), "addr=localhost");
        assert_eq!(lenient("addr=$HOST!", &env), "addr=localhost!");
    }

    #[test]
    fn test_unset_variable_expands_to_empty() {
        let env = FakeEnvironment::new();
        assert_eq!(lenient("x${MISSING}y", &env), "xy");
    }

    #[test]
    fn test_lone_dollar_is_literal() {
        let env = FakeEnvironment::new();
        assert_eq!(lenient("cost: 5$", &env), "cost: 5$");
        assert_eq!(lenient("a$ b", &env), "a$ b");
    }

    #[test]
    fn test_bad_syntax_consumed_silently() {
        let env = FakeEnvironment::new();
        assert_eq!(lenient("a${}b", &env), "ab");
        assert_eq!(lenient("a${unterminated", &env), "aunterminated");
    }

    #[test]
    fn test_shell_token_runs_command_and_escapes() {
        let env = FakeEnvironment::new().with_command("emit", "say \"hi\"\n");
        assert_eq!(lenient("${shell emit}", &env), "say \\\"hi\\\"");
    }

    #[test]
    fn test_shell_strips_exactly_one_trailing_newline() {
        let env = FakeEnvironment::new().with_command("emit", "out\n\n");
        assert_eq!(lenient("${shell emit}", &env), "out\\n");
    }

    #[test]
    fn test_shell_empty_command_embeds_diagnostic() {
        let env = FakeEnvironment::new();
        assert_eq!(lenient("${shell }", &env), "shell : missing args");
    }

    #[test]
    fn test_shell_failure_embeds_diagnostic_in_lenient_mode() {
        let env = FakeEnvironment::new().with_failing_command("boom", "exit status 1");
        let expanded = lenient("${shell boom}", &env);
        assert!(expanded.starts_with("shell boom: "), "got {expanded:?}");
        assert!(expanded.contains("exit status 1"));
    }

    #[test]
    fn test_shell_failure_is_error_in_strict_mode() {
        let env = FakeEnvironment::new().with_failing_command("boom", "exit status 1");
        let err = expand("${shell boom}", &env, ExpandMode::Strict).unwrap_err();
        assert!(matches!(err, ConfigError::ShellCommand { .. }));
    }

    #[test]
    fn test_shell_empty_command_is_error_in_strict_mode() {
        let env = FakeEnvironment::new();
        let err = expand("${shell }", &env, ExpandMode::Strict).unwrap_err();
        assert!(matches!(err, ConfigError::ShellCommand { .. }));
    }

    #[test]
    fn test_substituted_values_are_not_rescanned() {
        let env = FakeEnvironment::new()
            .with_var("OUTER", "${INNER}")
            .with_var("INNER", "nope");
        assert_eq!(lenient("${OUTER}", &env), "${INNER}");
    }

    #[test]
    fn test_shell_without_trailing_space_is_a_variable_name() {
        let env = FakeEnvironment::new().with_var("shell", "var-value");
        assert_eq!(lenient("${shell}", &env), "var-value");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_environment_runs_shell() {
        let env = SystemEnvironment;
        let out = env.execute("echo hello").unwrap();
        assert_eq!(out, "hello\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_environment_nonzero_exit_is_error() {
        let env = SystemEnvironment;
        let err = env.execute("exit 3").unwrap_err();
        assert!(err.to_string().contains("shell exited"));
    }
}
