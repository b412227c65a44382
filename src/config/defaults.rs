//! Default values for configuration
//!
//! Referenced by `#[serde(default = "...")]` attributes in the config
//! structs, so a partially written config file fills in sensibly.

pub fn default_skip_grid_files() -> bool {
    true
}

pub fn default_walk_max_depth() -> usize {
    32
}

pub fn default_query_candidates() -> Vec<String> {
    ["jacket", "shirt", "hair", "face"]
        .into_iter()
        .map(String::from)
        .collect()
}
