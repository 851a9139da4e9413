//! core components and types used throughout this library

/// Counter type defining operations required by the histogram and impls for primitives.
pub mod counter;

/// Pure bucket-index arithmetic shared by every counts backend.
pub mod layout;
