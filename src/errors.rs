mod inject;
mod instantiate;
mod registry;
mod resolve;

pub use inject::InjectErrorKind;
pub use instantiate::InstantiateErrorKind;
pub use registry::RegistryErrorKind;
pub use resolve::ResolveErrorKind;
