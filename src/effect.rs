//! Effects - side effects declared by the reducer

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Run the list query with this `search` pattern
    FetchSummaries { search: String },
    /// Run the detail query for this id
    FetchDetail { id: String },
    /// Drop the outstanding detail query, if any
    CancelDetail,
    /// Download and decode artwork
    FetchSprite { url: String },
}
