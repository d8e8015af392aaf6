//! Shared test flavor.

use crate::error::Result;
use crate::flavor::ParserFlavor;

/// Flavor that records every text run, upper-cased while `upper > 0`.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub events: Vec<String>,
    pub upper: usize,
}

impl ParserFlavor for Recorder {
    type Product = Vec<String>;

    fn reset(&mut self) {
        self.events.clear();
        self.upper = 0;
    }

    fn emit_text(&mut self, text: &str) -> Result<()> {
        let text = if self.upper > 0 {
            text.to_uppercase()
        } else {
            text.to_string()
        };
        self.events.push(text);
        Ok(())
    }

    fn product(&mut self) -> Self::Product {
        std::mem::take(&mut self.events)
    }
}
