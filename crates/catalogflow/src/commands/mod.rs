pub mod params;
pub mod products;
pub mod provision;
pub mod provisioned;
pub mod record;
pub mod terminate;
