/// Error display and classification tests.
pub mod error;
