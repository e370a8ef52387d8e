//! CLI exit codes.
//!
//! | Code | Meaning                                       |
//! |------|-----------------------------------------------|
//! | 0    | Success                                       |
//! | 1    | General error (output file, unexpected IO)    |
//! | 2    | Usage error (bad arguments, unknown variant)  |
//! | 3    | Settings file unreadable or invalid           |
//! | 4    | Dataset could not be loaded                   |
//! | 5    | A writer variant failed                       |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown variant names.
/// clap exits with the same code for malformed command lines.
pub const EXIT_USAGE: u8 = 2;

/// Settings file could not be read, parsed or validated.
pub const EXIT_CONFIG: u8 = 3;

/// CSV dataset missing, malformed or lacking a column.
pub const EXIT_DATA: u8 = 4;

/// A writer rejected its input or failed to produce a workbook.
pub const EXIT_WRITE: u8 = 5;
