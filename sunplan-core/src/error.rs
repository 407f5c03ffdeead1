use thiserror::Error;

/// Strict parse failures for profile values.
///
/// The planner itself never fails on bad input (see [`crate::SkinType::parse_lenient`]),
/// these only surface where a caller explicitly asks for validation, e.g. CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    #[error("Unknown skin type '{0}'. Expected I..VI (or a range like I-II).")]
    UnknownSkinType(String),

    #[error("Unknown clothing coverage '{0}'. Expected minimal, normal or covered.")]
    UnknownClothing(String),
}
