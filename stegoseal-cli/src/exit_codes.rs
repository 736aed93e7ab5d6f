//! Exit codes following sysexits.h conventions.
//!
//! These codes give scripts and CI systems a way to distinguish "the image
//! is tampered" from "the tool could not do its job".

#![allow(dead_code)] // Constants exist for documentation as much as for use

/// Successful execution / image authentic.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Verification failed: tampered or unverifiable image.
/// Maps to EX_DATAERR from sysexits.h.
pub const VERIFICATION_FAILED: i32 = 65;

/// Cannot open or decode the input image.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Cannot write an output file.
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// An exit code classified from an error chain.
pub struct ExitCode {
    pub code: i32,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        let code = if message.contains("Failed to read image") {
            INPUT_ERROR
        } else if message.contains("verification failed") {
            VERIFICATION_FAILED
        } else if message.contains("Failed to write") {
            IO_ERROR
        } else {
            GENERAL_ERROR
        };

        Self { code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_classification() {
        let input = anyhow!("whatever").context("Failed to read image: x.png");
        assert_eq!(ExitCode::from_anyhow(&input).code, INPUT_ERROR);

        let tampered = anyhow!("verification failed: 3 chunks tampered");
        assert_eq!(ExitCode::from_anyhow(&tampered).code, VERIFICATION_FAILED);

        let write = anyhow!("disk full").context("Failed to write sealed image");
        assert_eq!(ExitCode::from_anyhow(&write).code, IO_ERROR);

        let other = anyhow!("something else");
        assert_eq!(ExitCode::from_anyhow(&other).code, GENERAL_ERROR);
    }
}
