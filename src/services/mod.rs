//! # Business Logic Services
//!
//! This module contains the core business logic services for the Meetapp
//! application. Services encapsulate domain-specific functionality and
//! provide clean interfaces for use by HTTP handlers and other application
//! components.
//!
//! ## Available Services
//!
//! - **Eligibility** (`eligibility`) - Pure subscription decision engine
//! - **Subscription** (`subscription`) - Subscription orchestration and listing
//! - **Notification** (`notification`) - Organizer notification queue and worker
//! - **Email** (`email`) - Email delivery service with multiple implementations
//! - **JWT** (`jwt`) - Access token creation and validation

pub mod eligibility;
pub mod email;
pub mod jwt;
pub mod notification;
pub mod subscription;
