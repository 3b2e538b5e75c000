//! psetkit-canvas — publishing problem sets to Canvas LMS.
//!
//! Implements the `AssignmentStore` trait over the Canvas REST API, plus an
//! in-memory store for tests.

pub mod assignment;
pub mod body;
pub mod client;
pub mod error;
pub mod mock;
pub mod publish;
pub mod traits;

pub use assignment::AssignmentRef;
pub use client::CanvasClient;
pub use error::CanvasError;
pub use publish::{publish, PublishOutcome};
pub use traits::AssignmentStore;
