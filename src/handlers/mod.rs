//! # HTTP Request Handlers
//!
//! This module contains all HTTP request handlers for the Meetapp application.
//! Each handler is responsible for processing specific HTTP requests and
//! returning appropriate responses.
//!
//! ## Available Handlers
//!
//! - **Health Check** (`health_check`) - Application health monitoring
//! - **Meetups** (`meetups`) - Meetup CRUD for organizers
//! - **Subscriptions** (`subscriptions`) - Subscription creation and listing

mod health_check;
mod meetups;
mod subscriptions;

pub use health_check::*;
pub use meetups::*;
pub use subscriptions::*;
