//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case.

pub mod landing;
pub mod migration;

pub use landing::LandingPageService;
pub use migration::{check_statements, MigrationService};
