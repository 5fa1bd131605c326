pub mod redaction;

pub use redaction::{RedactingMakeWriter, RedactingWriter, redact_secrets};
