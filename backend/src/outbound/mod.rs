//! Driven adapters: infrastructure implementations of the domain's ports.

pub mod persistence;
