//! In-process implementation of the `Persistence` capability (§6).
//!
//! The durable backend behind this capability is out of scope (§1) — this
//! crate ships an in-memory store so the workspace builds and the pipeline
//! has something to run against end-to-end. Grounded in the teacher's
//! trait-plus-concrete-store pattern (`AppointmentStore` /
//! `ScyllaAppointmentStore`), minus the external database.

pub mod task_store;

pub use task_store::InMemoryTaskStore;

