//! Centralized constants for the cloudconf workspace.

/// Prefix that routes a config source to the secret store instead of the
/// filesystem.
pub const SECRET_MGR_PREFIX: &str = "secretmgr:";

/// Token prefix that marks the remainder of a `${...}` token as a shell
/// command line. The trailing space is part of the prefix.
pub const SHELL_TOKEN_PREFIX: &str = "shell ";

/// Shell used to execute `${shell ...}` tokens.
pub const SHELL_PROGRAM: &str = "/bin/sh";

/// File mode for dumped config files (owner read/write only).
pub const CONFIG_FILE_MODE: u32 = 0o600;
