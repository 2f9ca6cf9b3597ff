pub mod exclusions;
pub mod frameworks;
pub mod manifest;
pub mod options;

pub use exclusions::{detect_project_type, get_default_exclusions, scan_exclusions, ProjectType};
pub use frameworks::{
    descriptor_by_id, descriptors, select_framework, vanilla, Candidate, ExtractionPattern,
    FrameworkDescriptor, MatchReason, PatternKind, Selection,
};
pub use manifest::ProjectManifest;
pub use options::{load_config, AuditConfig, CONFIG_FILE_NAME};
