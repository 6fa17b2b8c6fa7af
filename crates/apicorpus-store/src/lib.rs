//! apicorpus-store
//!
//! Filesystem-backed collection store.
//!
//! The tree is keyed by canonical identity:
//!
//! ```text
//! <root>/<provider>/patch.json            provider-level merge patch
//! <root>/<provider>/<service>/patch.json  service-level merge patch
//! <root>/<provider>[/<service>]/<version>/spec.json
//! <root>/<provider>[/<service>]/<version>/patch.json
//! <root>/<provider>[/<service>]/<version>/fixup.json
//! ```
//!
//! Every document is written as canonical pretty JSON so that re-running an
//! update over unchanged sources leaves the tree byte-identical.

pub mod fs;
pub mod overlays;
pub mod timestamps;

pub use crate::fs::{Listing, ListingError, Store, StoreConfig, StoredDocument};
pub use crate::overlays::{compute_effective_patch, load_fixup, load_overlays, record_correction, save_fixup};
pub use crate::timestamps::FsTimestamps;
