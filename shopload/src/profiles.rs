//! Built-in workloads.
//!
//! `combined` drives all three services through the gateway; the others load a
//! single service through its own base path. The weight tables deliberately
//! differ, so the two kinds of workloads are kept apart.
pub mod combined;
pub mod favourite;
pub mod order;
pub mod payment;
