use std::fmt;
use std::str::FromStr;

use crate::InputError;

/// Content facet of a single page result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facet {
    /// Rendered markdown view.
    #[default]
    Preview,
    /// Raw markdown source.
    Raw,
    /// Page screenshot; only present when the service returned one.
    Screenshot,
    /// PDF rendition; only present when the service returned one.
    Document,
}

impl Facet {
    pub const ALL: [Facet; 4] = [Facet::Preview, Facet::Raw, Facet::Screenshot, Facet::Document];

    pub fn as_str(self) -> &'static str {
        match self {
            Facet::Preview => "preview",
            Facet::Raw => "raw",
            Facet::Screenshot => "screenshot",
            Facet::Document => "document",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Facet {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        // "pdf" is what the service calls the document rendition.
        if needle.eq_ignore_ascii_case("pdf") {
            return Ok(Facet::Document);
        }
        Facet::ALL
            .into_iter()
            .find(|facet| facet.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| InputError::UnknownFacet(needle.to_string()))
    }
}
