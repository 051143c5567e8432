/// Literal formatting helpers.
///
/// This module renders source literals in the textual form the target stack
/// machine expects: escaped string constants and C99 hexadecimal floats.
pub mod format;
