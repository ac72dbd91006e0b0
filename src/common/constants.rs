/// Column and file-name constants shared by the cleaning pipeline
/// These mirror the headers produced by the survey spreadsheets

// Column names (matched approximately by the column resolver)
pub const DEPARTMENT_COLUMN: &str = "Department";
pub const DEGREE_ANCHOR_COLUMN: &str = "Degree";
pub const GENDER_COLUMN: &str = "Gender";
pub const NAME_COLUMN: &str = "Name";
pub const CURRENT_INSTITUTION_COLUMN: &str = "Current Institution";
pub const CURRENT_REGION_COLUMN: &str = "Current Region";
pub const CURRENT_ALIAS_COLUMN: &str = "Current Alias";
pub const INSTITUTION_COLUMN: &str = "Institution";
pub const REGION_COLUMN: &str = "Region";
pub const ALIAS_COLUMN: &str = "Alias";

/// Filename prefix used by spreadsheet editors for lock/cache files
pub const LOCK_FILE_PREFIX: &str = "~$";

// Export file suffixes
pub const VERTEX_LIST_SUFFIX: &str = "vertex_list";
pub const EDGE_LIST_SUFFIX: &str = "edge_list";

/// Degree labels that identify a doctoral block (compared lowercase, dots removed)
pub const DOCTORAL_DEGREE_MARKERS: &[&str] = &["phd", "doctor", "dphil"];
