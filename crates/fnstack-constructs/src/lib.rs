//! fnstack-constructs - higher-level builders on top of the template model
//!
//! - [`FunctionBuilder`] adds a Lambda function with its own role, log group,
//!   parameter grants and observability layer.
//! - [`LayerBuilder`] bundles a layer's entry script and declares a layer
//!   version from the output directory.
//! - [`ResourceAspect`] applies a removal policy and tags to every resource.

pub mod error;
pub mod function;
pub mod layer;
pub mod parameter;
pub mod props;
pub mod resource_aspect;

pub use error::ConstructError;
pub use function::{Function, FunctionBuilder, FunctionSpec};
pub use layer::{BundleRequest, Bundler, EsbuildBundler, Layer, LayerBuilder, LayerManifest};
pub use parameter::ParameterBinding;
pub use props::{FunctionProps, VpcPlacement};
pub use resource_aspect::{ResourceAspect, TagSet};

pub type Result<T> = std::result::Result<T, ConstructError>;
