//! Transport layer: HTTP and wire-format details (serialization/deserialization).

pub mod nexxtmobile;
pub mod sipgate;
