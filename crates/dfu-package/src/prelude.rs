//! Prelude for dfu-package

pub use crate::descriptor::{PackageDescriptor, PackageRequest, PackageWarning, Signing};
pub use crate::reader::PackageContents;
pub use crate::requirements::{RequirementSet, RequirementSetReconciler};
pub use crate::validator::CombinationValidator;
pub use crate::version::VersionCodec;
pub use crate::writer::PackageWriter;
