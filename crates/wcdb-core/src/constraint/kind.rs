//! Constraint kind tags.

use std::fmt;

/// Discriminant of a constraint variant, written as the envelope tag.
///
/// The tag of a kind is its position in [`ConstraintKind::ALL`]. Tags are
/// permanent: new kinds are appended, existing ones are never reordered or
/// reused.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// Conjunction of child constraints.
    Composed = 0,
    /// Comparison over a function of the column value.
    Function = 1,
    /// Comparison of the column value against a literal.
    Scalar = 2,
    /// Named function applied to the column.
    UnaryFunction = 3,
}

impl ConstraintKind {
    /// All kinds in tag order.
    pub const ALL: [ConstraintKind; 4] = [
        ConstraintKind::Composed,
        ConstraintKind::Function,
        ConstraintKind::Scalar,
        ConstraintKind::UnaryFunction,
    ];

    /// Wire tag of the kind.
    pub fn tag(self) -> i32 {
        self as i32
    }

    /// Resolve a wire tag.
    pub fn from_tag(tag: i32) -> Option<Self> {
        usize::try_from(tag)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::Composed => "COMPOSED",
            ConstraintKind::Function => "FUNCTION",
            ConstraintKind::Scalar => "SCALAR",
            ConstraintKind::UnaryFunction => "UNARY_FUNCTION",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Changing this table changes how persisted metadata is read.
    #[test]
    fn test_kind_tags_are_permanent() {
        let expected = [
            (ConstraintKind::Composed, 0),
            (ConstraintKind::Function, 1),
            (ConstraintKind::Scalar, 2),
            (ConstraintKind::UnaryFunction, 3),
        ];
        assert_eq!(ConstraintKind::ALL.len(), expected.len());
        for (kind, tag) in expected {
            assert_eq!(kind.tag(), tag, "{kind}");
            assert_eq!(ConstraintKind::from_tag(tag), Some(kind));
        }
    }

    #[test]
    fn test_tag_matches_position() {
        for (position, kind) in ConstraintKind::ALL.iter().enumerate() {
            assert_eq!(kind.tag() as usize, position);
        }
    }

    #[test]
    fn test_unknown_tags() {
        assert_eq!(ConstraintKind::from_tag(4), None);
        assert_eq!(ConstraintKind::from_tag(-1), None);
    }
}
