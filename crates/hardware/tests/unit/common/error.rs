//! Error Type Tests.
//!
//! Checks the user-facing messages and which command errors end a run.

use cachesim_core::common::{ConfigError, ScriptError};

#[test]
fn config_error_messages() {
    assert_eq!(
        ConfigError::ZeroWays.to_string(),
        "number of ways must be at least 1"
    );
    assert_eq!(
        ConfigError::WordsPerBlock { words: 64, max: 32 }.to_string(),
        "words per block must be between 1 and 32, got 64"
    );
    assert_eq!(
        ConfigError::UnevenSets {
            blocks: 16,
            ways: 3
        }
        .to_string(),
        "3 ways do not evenly divide 16 blocks"
    );
    assert_eq!(
        ConfigError::TooManyBlocks {
            blocks: 70000,
            max: 65536
        }
        .to_string(),
        "number of blocks must be at most 65536, got 70000"
    );
    assert_eq!(
        ConfigError::CacheTooLarge {
            capacity: 16384,
            size: 8192
        }
        .to_string(),
        "cache of 16384 bytes does not fit in 8192 bytes of memory"
    );
}

/// Usage errors print the two-line interactive usage text.
#[test]
fn usage_error_message() {
    let err = ScriptError::Usage {
        command: "lw",
        usage: "lw <address to load>",
    };
    assert_eq!(
        err.to_string(),
        "Wrong input for lw\nUsage: lw <address to load>"
    );
}

#[test]
fn address_error_message() {
    let err = ScriptError::AddressOutOfRange {
        addr: 0x2000,
        size: 8192,
    };
    assert_eq!(
        err.to_string(),
        "address 0x00002000 is outside the 8192-byte memory"
    );
}

#[test]
fn config_error_is_transparent_in_script_error() {
    let err = ScriptError::from(ConfigError::ZeroBlocks);
    assert_eq!(err.to_string(), "number of blocks must be at least 1");
}

#[test]
fn fatal_classification() {
    assert!(!ScriptError::InvalidNumber("zz".into()).is_fatal());
    assert!(
        !ScriptError::AddressOutOfRange {
            addr: 0,
            size: 0
        }
        .is_fatal()
    );
    assert!(
        !ScriptError::Usage {
            command: "sw",
            usage: ""
        }
        .is_fatal()
    );
    assert!(ScriptError::MissingGeometry.is_fatal());
    assert!(ScriptError::from(ConfigError::ZeroWays).is_fatal());
    let io = ScriptError::from(std::io::Error::other("closed"));
    assert!(io.is_fatal());
}
