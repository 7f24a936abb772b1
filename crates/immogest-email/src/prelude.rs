pub use immogest_types::error::{Error, IgResult};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
