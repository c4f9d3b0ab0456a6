//! The built-in sources. Each module only describes its site; fetching and
//! normalization are shared.

use crate::source::SourceDescriptor;

pub mod aws;
pub mod csstricks;
pub mod freecodecamp;
pub mod nodeweekly;
pub mod theverge;

/// Returns the descriptors of every built-in source
pub fn descriptors() -> Vec<SourceDescriptor> {
    vec![
        theverge::descriptor(),
        freecodecamp::descriptor(),
        aws::descriptor(),
        csstricks::descriptor(),
        nodeweekly::descriptor(),
    ]
}
