//! API Routes
//!
//! Route handlers organized by functionality.

pub mod budgets;
pub mod dashboard;
pub mod goals;
pub mod health;
pub mod holdings;
pub mod import;
pub mod networth;
pub mod queue;
pub mod settings;
pub mod transactions;
