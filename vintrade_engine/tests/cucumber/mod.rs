mod steps;
mod world;

pub use world::{ReconciliationSystem, ReconciliationWorld};
