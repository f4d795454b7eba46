pub mod images;
pub mod instances;
pub mod meta;
pub mod places;
pub mod pomucky;
pub mod stats;
pub mod token;
pub mod users;
