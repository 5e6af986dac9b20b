//! Links and their views

/// A shortened URL
///
/// Never changes once created
#[derive(Clone, Debug)]
pub struct Link {
    /// Link ID, the source of the short token
    pub id: u64,

    /// Location the short token redirects to, as it was posted
    pub url: String,
}

/// A single redirect through a link
#[derive(Clone, Debug)]
pub struct ViewEvent {
    /// The ID that was requested, not necessarily an existing link
    pub link_id: u64,
}
