use crate::defaults;
use serde::Deserialize;

/// Page size policy shared by every listing.
///
/// Callers only pick the page index; the size always comes from here.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    defaults::PAGE_SIZE
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::PAGE_SIZE,
        }
    }
}
