//! Entity models for both AuroraHR stores.
//!
//! `company`, `user` and `employee` live in the relational store. The
//! remaining modules are collection-style records in the document store and
//! always carry the owning `company_id`.

pub mod company;
pub mod employee;
pub mod hr_document;
pub mod onboarding_checklist;
pub mod performance_review;
pub mod user;
