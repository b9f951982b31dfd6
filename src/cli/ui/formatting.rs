use std::fmt;

use crate::cli::output;

/// Small helper for consistent header/detail rendering in detail views.
pub struct Formatter;

impl Formatter {
    pub fn new() -> Self {
        Self
    }

    pub fn print_header(&self, title: impl fmt::Display) {
        output::section(title);
    }

    pub fn print_detail(&self, message: impl fmt::Display) {
        output::info(format!("  {message}"));
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}
