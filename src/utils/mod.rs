pub mod diagnostics;
pub mod logging;

pub use diagnostics::{CapturingSink, DiagnosticEvent, DiagnosticSink, TracingSink};
