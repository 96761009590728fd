//! Area-name resolution
//!
//! Maps ZIP codes to human-readable labels from reference files, the curated
//! specific-mapping table and the ZIP-prefix heuristic, and rewrites the
//! stored snapshot with the results.

pub mod reference;
pub mod resolver;
pub mod static_tables;
pub mod updater;

pub use reference::{load_reference_source, MunicipalityTable, ZipReferenceTable};
pub use resolver::{AreaNameResolver, AreaNameSource, Resolution};
pub use static_tables::{PrefixHeuristic, SpecificMappings, StaticTables};
pub use updater::{apply_area_names, update_snapshot, UpdateSummary};
