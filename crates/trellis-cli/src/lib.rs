pub mod cli;
pub mod commands;
pub mod logging;

/// Process exit codes
pub mod exit_codes {
    pub const INVALID_DOCUMENT: u8 = 2;
    pub const UNSUPPORTED_VERSION: u8 = 3;
    pub const FETCH_FAILED: u8 = 4;
}
