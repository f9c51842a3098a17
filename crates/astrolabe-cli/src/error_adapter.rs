//! Error adapter for converting AstrolabeError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use astrolabe::AstrolabeError;

/// Adapter giving an [`AstrolabeError`] a diagnostic code and help text.
pub struct ErrorAdapter<'a>(pub &'a AstrolabeError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            AstrolabeError::Io(_) => "astrolabe::io",
            AstrolabeError::Protocol(_) => "astrolabe::protocol",
            AstrolabeError::Simulation(_) => "astrolabe::simulation",
            AstrolabeError::Worker(_) => "astrolabe::worker",
            AstrolabeError::Timeout(_) => "astrolabe::timeout",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            AstrolabeError::Protocol(_) => {
                "expected a JSON object with `entities` and `connections` arrays"
            }
            AstrolabeError::Simulation(_) => "run again with `--fallback` for a static layout",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Convert an [`AstrolabeError`] into the list of diagnostics to render.
pub fn to_reportables(err: &AstrolabeError) -> Vec<ErrorAdapter<'_>> {
    vec![ErrorAdapter(err)]
}
