//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod image_repo;
pub mod instance_repo;
pub mod place_repo;
pub mod pomucka_repo;
pub mod stats_repo;
pub mod user_repo;

pub use image_repo::ImageRepo;
pub use instance_repo::InstanceRepo;
pub use place_repo::PlaceRepo;
pub use pomucka_repo::PomuckaRepo;
pub use stats_repo::StatsRepo;
pub use user_repo::UserRepo;
