pub use crate::app::App;
pub use immogest_types::error::{Error, IgResult};
pub use immogest_types::types::{Timestamp, TnId};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
