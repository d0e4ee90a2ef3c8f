//! Receding-horizon forward-search planner for a 2D side-scrolling agent.
//!
//! The planner drives an agent as far right as possible while avoiding
//! irrecoverable damage (gap falls), by running a weighted best-first search
//! over macro-actions against a snapshot/restore-capable physics simulator
//! (the `WorldModel` trait), then committing a short prefix of the best plan
//! and replanning from a predicted future state.

pub mod action;
pub mod budget;
pub mod config;
pub mod motion;
pub mod node;
pub mod plan;
pub mod planner;
pub mod search;
pub mod visited;
pub mod world;

#[cfg(any(test, feature = "shim"))]
pub mod shim;

pub use action::Action;
pub use budget::CpuBudget;
pub use config::PlannerConfig;
pub use plan::Plan;
pub use planner::Planner;
pub use search::{SearchEpisode, SearchStats};
pub use world::{RestoreGuard, WorldModel};
