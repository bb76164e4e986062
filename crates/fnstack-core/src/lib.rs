//! fnstack-core - CloudFormation template model
//!
//! The smallest model the fnstack builders need to emit a deployable
//! template: typed Lambda enums, intrinsic helpers, IAM policy documents,
//! resources arranged in a construct tree, and a stack that renders them.

pub mod aspect;
pub mod asset;
pub mod construct;
pub mod error;
pub mod iam;
pub mod intrinsic;
pub mod naming;
pub mod resource;
pub mod stack;
pub mod template;
pub mod types;

pub use aspect::{walk, Aspect};
pub use asset::{Asset, AssetPackaging, BundlingOptions};
pub use construct::{ConstructNode, NodeKind};
pub use error::CoreError;
pub use iam::{resource_tag_condition, Effect, PolicyDocument, PolicyStatement};
pub use naming::logical_id;
pub use resource::{CfnResource, TagManager};
pub use stack::{Stack, TemplateParameter};
pub use template::Template;
pub use types::{Architecture, RemovalPolicy, Runtime, Tracing};
