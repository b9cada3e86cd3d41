/// Standard Unix exit codes for the bkimport CLI application.
///
/// These codes follow the BSD convention where possible and provide
/// meaningful feedback about the type of error that occurred.
///
/// Successful termination
pub const SUCCESS: i32 = 0;

/// Command line usage error - invalid arguments, missing database, etc.
pub const USAGE: i32 = 64;

/// Input data could not be read or decoded
pub const DATAERR: i32 = 65;

/// Storage permission was denied
pub const PERMISSION: i32 = 77;

/// Operation was cancelled by user (declined confirmation or Ctrl+C)
pub const CANCEL: i32 = 130;
