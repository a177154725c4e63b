//! Progress display while a run is in flight

pub mod reporter;
