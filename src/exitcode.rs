//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Malformed or invalid tree
pub const DATAERR: i32 = 65;

/// Tree file missing
pub const NOINPUT: i32 = 66;

/// Internal software error (e.g. directions disagreeing)
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
