/// Router Module Index
///
/// Routes are split by whether they need a resolved identity. Role checks are
/// not done here: each protected handler names its policy through the
/// `Authorized<P>` extractor.

/// Routes reachable without a token.
pub mod public;

/// Routes behind `auth_middleware`.
pub mod authenticated;
