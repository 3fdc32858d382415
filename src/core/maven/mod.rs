mod artifact;
mod range;
mod version;

pub use artifact::ArtifactIdentity;
pub use range::{Bound, Restriction, VersionRange};
pub use version::ArtifactVersion;
