//! card-lookup: card metadata lookups for packslip
//!
//! Two chained services resolve a ledger row to card images:
//!
//! 1. [`CardSearch`] maps a card name to every known printing, each tagged
//!    with its edition label and a detail-service id.
//! 2. [`CardDetails`] maps that id to the full card record, whose image URIs
//!    end up on the visual checklist.
//!
//! Both are traits so the pipeline can run against in-memory fakes; the HTTP
//! implementations live in [`client`].

pub mod client;
pub mod error;
pub mod model;

use async_trait::async_trait;

pub use client::{
    LookupConfig, MultiverseBridgeClient, ScryfallClient, DEFAULT_DETAIL_URL, DEFAULT_SEARCH_URL,
};
pub use error::LookupError;
pub use model::{CardCandidate, CardFace, CardRecord, ImageUris};

/// Result type for lookup operations
pub type Result<T> = std::result::Result<T, LookupError>;

/// Search-by-name lookup (service A).
#[async_trait]
pub trait CardSearch: Send + Sync {
    /// Every printing the service knows for `card_name`, in service order.
    async fn search_by_name(&self, card_name: &str) -> Result<Vec<CardCandidate>>;
}

/// Detail-by-id lookup (service B).
#[async_trait]
pub trait CardDetails: Send + Sync {
    /// Full record for a printing id returned by [`CardSearch`].
    async fn card_by_id(&self, card_id: &str) -> Result<CardRecord>;
}

/// Pick the first printing whose edition label equals `set_name` exactly.
pub fn select_printing<'a>(
    candidates: &'a [CardCandidate],
    set_name: &str,
) -> Option<&'a CardCandidate> {
    candidates.iter().find(|c| c.edition == set_name)
}
