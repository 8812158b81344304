//! Line classification for simulation logs.
//!
//! Each recognized line kind is a `Trigger`. Classification is by
//! substring, tested in a fixed priority order; the first match wins, so
//! a line is never handled by more than one trigger.

use std::fmt;

/// Separator between a field label and its value.
pub const VALUE_SEPARATOR: &str = ": ";

/// A log line kind that updates the record being accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// MPI task count; starts a fresh record.
    Ranks,
    /// Start of a new problem block.
    ProblemName,
    /// Mesh box faces; the second comma field is the resolution.
    BoxFaces,
    /// Basis node count; degree is this minus one.
    BasisNodes,
    /// Quadrature point count.
    QuadraturePoints,
    /// Global degrees of freedom.
    GlobalDofs,
    /// Max error norm.
    MaxError,
}

impl Trigger {
    /// All triggers in match priority order.
    pub const PRIORITY: [Trigger; 7] = [
        Trigger::Ranks,
        Trigger::ProblemName,
        Trigger::BoxFaces,
        Trigger::BasisNodes,
        Trigger::QuadraturePoints,
        Trigger::GlobalDofs,
        Trigger::MaxError,
    ];

    /// The substring that identifies this trigger.
    pub fn needle(&self) -> &'static str {
        match self {
            Trigger::Ranks => "rank(s)",
            Trigger::ProblemName => "Problem Name",
            Trigger::BoxFaces => "Box Faces",
            Trigger::BasisNodes => "Basis Nodes",
            Trigger::QuadraturePoints => "Quadrature Points",
            Trigger::GlobalDofs => "Global DoFs",
            Trigger::MaxError => "Max Error",
        }
    }

    /// Classify a line. Returns `None` for lines no trigger recognizes.
    pub fn classify(line: &str) -> Option<Trigger> {
        Self::PRIORITY
            .iter()
            .copied()
            .find(|trigger| line.contains(trigger.needle()))
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.needle())
    }
}

/// Text after the first `": "` on a line, if the separator is present.
pub fn value_after_separator(line: &str) -> Option<&str> {
    line.split_once(VALUE_SEPARATOR).map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_trigger() {
        let cases = [
            ("Number of MPI rank(s): 2", Trigger::Ranks),
            ("Problem Name: diffusion", Trigger::ProblemName),
            ("Mesh Box Faces: 4, 8, 8", Trigger::BoxFaces),
            ("Basis Nodes: 3", Trigger::BasisNodes),
            ("Quadrature Points: 4", Trigger::QuadraturePoints),
            ("Global DoFs: 512", Trigger::GlobalDofs),
            ("Max Error: 1.2e-3", Trigger::MaxError),
        ];

        for (line, expected) in cases {
            assert_eq!(Trigger::classify(line), Some(expected), "line: {}", line);
        }
    }

    #[test]
    fn test_classify_ignores_noise() {
        assert_eq!(Trigger::classify(""), None);
        assert_eq!(Trigger::classify("-- libCEED example --"), None);
        assert_eq!(Trigger::classify("  Owned Nodes: 1331"), None);
    }

    #[test]
    fn test_first_match_wins() {
        // Contains both "Problem Name" and "Max Error"
        let line = "Problem Name: Max Error study";
        assert_eq!(Trigger::classify(line), Some(Trigger::ProblemName));

        // Contains both "rank(s)" and "Global DoFs"
        let line = "Global DoFs per rank(s): 64";
        assert_eq!(Trigger::classify(line), Some(Trigger::Ranks));

        // Contains both "Basis Nodes" and "Quadrature Points"
        let line = "Basis Nodes vs Quadrature Points: 3";
        assert_eq!(Trigger::classify(line), Some(Trigger::BasisNodes));
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(Trigger::classify("max error: 0.1"), None);
        assert_eq!(Trigger::classify("problem name: foo"), None);
    }

    #[test]
    fn test_priority_matches_needles() {
        let needles: Vec<_> = Trigger::PRIORITY.iter().map(|t| t.needle()).collect();
        assert_eq!(
            needles,
            vec![
                "rank(s)",
                "Problem Name",
                "Box Faces",
                "Basis Nodes",
                "Quadrature Points",
                "Global DoFs",
                "Max Error",
            ]
        );
    }

    #[test]
    fn test_value_after_separator() {
        assert_eq!(value_after_separator("Max Error: 0.5"), Some("0.5"));
        assert_eq!(value_after_separator("A: b: c"), Some("b: c"));
        assert_eq!(value_after_separator("Max Error 0.5"), None);
        assert_eq!(value_after_separator("Max Error:0.5"), None);
    }
}
