//! # Adapters Layer

pub mod local_replica;

pub use local_replica::LocalReplica;
