//! Weekly meal-plan model.
//!
//! A [`plan::MealPlan`] holds seven days, each day an ordered list of meal
//! entries tagged with a meal slot. Entries are added and removed through
//! [`plan::PlanBuilder`], their adherence moves forward exactly once through
//! [`adherence::AdherenceStateMachine`], and [`nutrition`] derives totals and
//! completion figures on read. [`service::PlanService`] ties these to a
//! [`store::PlanStore`].

pub mod adherence;
pub mod error;
pub mod nutrition;
pub mod plan;
pub mod service;
pub mod store;

pub use error::{PlanError, Violation};
