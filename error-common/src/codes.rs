// Fixed error messages
// Callers distinguish failures by message text, so these strings are part of the contract.

pub mod messages {
    pub const PAGE_SIZE_INVALID: &str = "Page size invalid!";
    pub const PAGE_NUMBER_INVALID: &str = "Page number invalid!";
    pub const INVALID_SORT_ORDER: &str = "Invalid sort order. Use 'asc' or 'desc'";
    pub const NO_DATA_FOUND: &str = "No data found!";
    pub const PATCH_DOCUMENT_MISSING: &str = "Patch document is missing!";
}
