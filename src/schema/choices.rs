use std::fmt;

/// A closed set of wire values a request field may take.
pub trait Choice: Sized + Copy {
    /// Canonical wire values, in display order.
    const WIRE_VALUES: &'static [&'static str];

    fn from_wire(value: &str) -> Option<Self>;

    fn as_wire(&self) -> &'static str;
}

/// Output language for generated study material.
///
/// The value is forwarded to the model verbatim; nothing here translates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Bengali,
    Mixed,
}

impl Language {
    /// Whether the model must write in Bengali script (fully or in part).
    pub fn uses_bengali_script(&self) -> bool {
        !matches!(self, Self::English)
    }
}

impl Choice for Language {
    const WIRE_VALUES: &'static [&'static str] = &["English", "Bengali", "Mixed Bangla-English"];

    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "English" => Some(Self::English),
            "Bengali" => Some(Self::Bengali),
            // Short alias accepted from the command line.
            "Mixed Bangla-English" | "Mixed" => Some(Self::Mixed),
            _ => None,
        }
    }

    fn as_wire(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Bengali => "Bengali",
            Self::Mixed => "Mixed Bangla-English",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Difficulty level for a mock test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Choice for Difficulty {
    const WIRE_VALUES: &'static [&'static str] = &["easy", "medium", "hard"];

    fn from_wire(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    fn as_wire(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_round_trip() {
        for value in Language::WIRE_VALUES {
            let language = Language::from_wire(value).expect("known language");
            assert_eq!(language.as_wire(), *value);
        }
        for value in Difficulty::WIRE_VALUES {
            let difficulty = Difficulty::from_wire(value).expect("known difficulty");
            assert_eq!(difficulty.as_wire(), *value);
        }
    }

    #[test]
    fn mixed_alias_maps_to_canonical_value() {
        assert_eq!(Language::from_wire("Mixed"), Some(Language::Mixed));
        assert_eq!(Language::Mixed.as_wire(), "Mixed Bangla-English");
    }

    #[test]
    fn only_english_skips_bengali_script() {
        assert!(!Language::English.uses_bengali_script());
        assert!(Language::Bengali.uses_bengali_script());
        assert!(Language::Mixed.uses_bengali_script());
    }
}
