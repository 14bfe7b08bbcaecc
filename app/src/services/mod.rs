//! Host-facing collaborators of the reconciliation loop.

pub mod browser;
#[cfg(test)]
mod fake_driver;
pub mod idle;
pub mod notify;
pub mod profile_image;
