//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Tables are identical (within tolerance)            |
//! | 1    | Differences found, like `diff(1)`                  |
//! | 2    | Usage error (bad arguments, unknown row key)       |
//! | 3    | I/O error (missing file, unwritable output)        |
//! | 4    | Input could not be loaded (bad CSV, bad workbook)  |
//! | 5    | Configuration file invalid                         |

/// Comparison ran and found no differences.
pub const EXIT_SUCCESS: u8 = 0;

/// Comparison ran and found at least one changed cell.
pub const EXIT_DIFFERENCES: u8 = 1;

/// Bad arguments. clap also exits with 2 on parse failures.
pub const EXIT_USAGE: u8 = 2;

pub const EXIT_IO: u8 = 3;

/// Unsupported file type, malformed CSV, unreadable workbook, missing sheet.
pub const EXIT_LOAD: u8 = 4;

/// TOML parse or validation failure.
pub const EXIT_CONFIG: u8 = 5;
