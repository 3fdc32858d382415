// ─── jarjar Core ───
// Resolution of embedded (jar-in-jar) dependencies for a mod loader.
//
// Architecture:
//   core/
//     maven/     : Artifact identities, versions, version ranges
//     package/   : Read-only view of discovered mod files (jar / memory)
//     catalog/   : Dependency manifests → candidates + requests
//     resolver/  : Version selection, run driver, conflict reports
//     cache/     : Content-addressed extraction of selected jars
//     locator    : Feeding resolved jars back into discovery
//     settings   : Resolver settings + default locations

pub mod cache;
pub mod catalog;
pub mod error;
pub mod locator;
pub mod maven;
pub mod package;
pub mod resolver;
pub mod settings;
