use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::Deserialize;
use serde::Serialize;

bitflags! {
    /// Runtime environment bits.
    ///
    /// `RELEASE`, `EDITOR` and `DEVELOPMENT` are the core values: exactly one
    /// of them is active in a process. The remaining constants are unions of
    /// cores and are only ever used as comparison targets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mode: u8 {
        const RELEASE = 1 << 0;
        const EDITOR = 1 << 1;
        const DEVELOPMENT = 1 << 2;
        const BUILD = Self::DEVELOPMENT.bits() | Self::RELEASE.bits();
        const EDITOR_OR_DEVELOPMENT = Self::EDITOR.bits() | Self::DEVELOPMENT.bits();
        const ALL = Self::RELEASE.bits() | Self::EDITOR_OR_DEVELOPMENT.bits();
    }
}

const NAMED_MODES: [(&str, Mode); 6] = [
    ("release", Mode::RELEASE),
    ("editor", Mode::EDITOR),
    ("development", Mode::DEVELOPMENT),
    ("build", Mode::BUILD),
    ("editor_or_development", Mode::EDITOR_OR_DEVELOPMENT),
    ("all", Mode::ALL),
];

impl Mode {
    pub fn label(self) -> &'static str {
        NAMED_MODES
            .iter()
            .find(|(_, mode)| *mode == self)
            .map_or("custom", |(label, _)| label)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown environment mode: {0}")]
pub struct UnknownModeError(pub String);

impl FromStr for Mode {
    type Err = UnknownModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        NAMED_MODES
            .iter()
            .find(|(label, _)| *label == normalized)
            .map(|(_, mode)| *mode)
            .ok_or_else(|| UnknownModeError(value.to_string()))
    }
}

impl Serialize for Mode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Containment test: true iff every bit of `target` is also set in `mode`.
///
/// This is deliberately not an intersection test. `is(EDITOR,
/// EDITOR_OR_DEVELOPMENT)` is false while `is(EDITOR_OR_DEVELOPMENT, EDITOR)`
/// is true.
pub fn is(mode: Mode, target: Mode) -> bool {
    (target & mode) == target
}

/// The environment the process runs under, fixed at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
    active: Mode,
}

impl Environment {
    /// Classifies the process from the `editor` and `development` cargo
    /// features of this crate.
    pub fn resolve() -> Self {
        Self::from_signals(cfg!(feature = "editor"), cfg!(feature = "development"))
    }

    /// Editor without development instrumentation is `EDITOR`, development
    /// instrumentation outside the editor is `DEVELOPMENT`, every other
    /// combination is `RELEASE`.
    pub fn from_signals(editor: bool, development: bool) -> Self {
        let active = match (editor, development) {
            (true, false) => Mode::EDITOR,
            (false, true) => Mode::DEVELOPMENT,
            _ => Mode::RELEASE,
        };
        Self { active }
    }

    pub fn mode(self) -> Mode {
        self.active
    }

    /// Whether the active core falls inside `category`.
    pub fn is_in(self, category: Mode) -> bool {
        is(category, self.active)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.active, f)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn conjugates_are_unions_of_cores() {
        assert_eq!(Mode::BUILD.bits(), 0b101);
        assert_eq!(Mode::EDITOR_OR_DEVELOPMENT.bits(), 0b110);
        assert_eq!(Mode::ALL.bits(), 0b111);
    }

    #[test]
    fn containment_is_asymmetric() {
        assert!(!is(Mode::EDITOR, Mode::EDITOR_OR_DEVELOPMENT));
        assert!(is(Mode::EDITOR_OR_DEVELOPMENT, Mode::EDITOR));
        assert!(is(Mode::BUILD, Mode::RELEASE));
        assert!(!is(Mode::RELEASE, Mode::BUILD));
        assert!(!is(Mode::RELEASE, Mode::ALL));
        assert!(is(Mode::ALL, Mode::ALL));
    }

    #[test]
    fn containment_matches_bitwise_definition() {
        for mode in 0..=Mode::ALL.bits() {
            for target in 0..=Mode::ALL.bits() {
                let mode = Mode::from_bits_truncate(mode);
                let target = Mode::from_bits_truncate(target);
                assert_eq!(is(mode, target), (target & mode) == target);
            }
        }
    }

    #[test]
    fn signals_resolve_to_exactly_one_core() {
        assert_eq!(Environment::from_signals(true, false).mode(), Mode::EDITOR);
        assert_eq!(
            Environment::from_signals(false, true).mode(),
            Mode::DEVELOPMENT
        );
        assert_eq!(Environment::from_signals(false, false).mode(), Mode::RELEASE);
        assert_eq!(Environment::from_signals(true, true).mode(), Mode::RELEASE);
        let resolved = Environment::resolve().mode();
        assert!([Mode::RELEASE, Mode::EDITOR, Mode::DEVELOPMENT].contains(&resolved));
    }

    #[test]
    fn build_category_excludes_editor() {
        assert!(Environment::from_signals(false, false).is_in(Mode::BUILD));
        assert!(Environment::from_signals(false, true).is_in(Mode::BUILD));
        assert!(!Environment::from_signals(true, false).is_in(Mode::BUILD));
        assert!(Environment::from_signals(true, false).is_in(Mode::ALL));
    }

    #[test]
    fn modes_parse_from_labels() {
        assert_eq!("build".parse::<Mode>(), Ok(Mode::BUILD));
        assert_eq!("Editor-Or-Development".parse::<Mode>(), Ok(Mode::EDITOR_OR_DEVELOPMENT));
        assert_eq!(Mode::DEVELOPMENT.to_string(), "development");
        assert!("nightly".parse::<Mode>().is_err());
    }
}
