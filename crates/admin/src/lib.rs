//! Back-office tooling: the model registry, changelist views with in-place
//! editing, the product export, and backend preparation for the CLI.

pub mod changelist;
pub mod error;
pub mod registry;
pub mod resource;
pub mod startup;

pub use changelist::{Changelist, ChangelistRow, changelist, edit_in_place};
pub use error::AdminError;
pub use registry::{AdminSite, Model, ModelAdmin, site};
pub use resource::{ProductExportRow, ProductResource};
pub use startup::prepare;
