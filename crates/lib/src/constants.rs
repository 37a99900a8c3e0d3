//! Constants used throughout the datasets library.
//!
//! Central definitions of the macro syntax and built-in macro names.

/// Character that opens a macro call.
pub const MACRO_MARKER: char = '#';

/// Escape character for literal text.
pub const ESCAPE: char = '\\';

/// Characters that lose a preceding [`ESCAPE`] and are kept literally.
pub const ESCAPABLE: [char; 7] = ['&', '$', '"', '\'', '\\', '<', '>'];

/// Separator between macro arguments.
pub const ARGUMENT_SEPARATOR: char = ',';

/// Separator between segments of a single dotted reference argument.
pub const REFERENCE_SEPARATOR: char = '.';

/// Longest output `#RANDOM(n)` and `#RANDOMCHARS(n)` may produce.
pub const MAX_RANDOM_LENGTH: usize = 4096;

/// Default Java-style pattern used by `#DATE` when none is given.
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd";

/// Built-in macro names.
pub mod names {
    pub const RANDOM: &str = "RANDOM";
    pub const RANDOM_BETWEEN: &str = "RANDOMBETWEEN";
    pub const RANDOM_CHAR: &str = "RANDOMCHAR";
    pub const RANDOM_CHARS: &str = "RANDOMCHARS";
    pub const UUID: &str = "UUID";
    pub const UUID_UPPER: &str = "UUID_UPPER";
    pub const DATE: &str = "DATE";
    pub const CONCAT: &str = "CONCAT";
    pub const REF: &str = "REF";
    pub const REF_DSL: &str = "REF_DSL";
    pub const REF_THIS: &str = "REF_THIS";
}
