//! Default configuration values for memprobe

/// Default traversal search budget (nodes examined before giving up on a
/// corrupt or unexpectedly large structure).
pub const MAX_SEARCH: usize = 256;

/// Default output budget per traversal.
pub const MAX_PRINT: usize = 20;

/// Default region-chain budget for scattered strings.
pub const MAX_REGIONS: usize = 64;

/// Explicit sizes the memory commands accept.
pub const ALLOWED_SIZES: [usize; 6] = [1, 2, 4, 8, 16, 32];

/// Auto-derived dump width cap when no explicit size is given.
pub const AUTO_SIZE_CAP: usize = 16;

pub fn default_max_search() -> usize {
    MAX_SEARCH
}

pub fn default_max_print() -> usize {
    MAX_PRINT
}

pub fn default_max_regions() -> usize {
    MAX_REGIONS
}

pub fn default_pointer_size() -> usize {
    8
}

pub fn default_byte_order() -> String {
    "little".to_string()
}

pub fn default_list_link() -> String {
    "list_head".to_string()
}

pub fn default_tree_link() -> String {
    "avl_node".to_string()
}

pub fn default_scatter_type() -> String {
    "sstring".to_string()
}

pub fn default_address_types() -> Vec<String> {
    vec!["ip_addr_t".to_string(), "wad_addr".to_string()]
}

pub fn default_errno_expr() -> String {
    "errno".to_string()
}

pub fn default_context_var() -> String {
    "ses_ctx".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_log_file() -> String {
    String::new()
}
