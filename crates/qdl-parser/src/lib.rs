pub mod counter;
pub mod normalizer;

pub use counter::{count_sections, SectionCounts};
pub use normalizer::{check_balance, normalize, strip_whitespace, CharOrigin, NormalizedSource};
