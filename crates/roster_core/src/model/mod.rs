//! Domain model for members, teams, and read-side views.
//!
//! # Responsibility
//! - Define the two stored entities and the lightweight projection built
//!   from them on read.
//!
//! # Invariants
//! - Identities are assigned by the record store and never change.
//! - The member/team relationship is only mutated through
//!   `MemberRepository::assign_team`, which keeps both sides in step.

pub mod member;
pub mod team;
pub mod view;
