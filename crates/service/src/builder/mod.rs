//! Template builder: a JSON draft edited step by step, then submitted as template rows.

pub mod draft;
pub mod service;

pub use draft::{
    next_revision, ActionPatch, BuildAction, BuildActionTool, BuildAttachment, BuildMetadata, BuildPartDemand,
    BuildState, MetadataPatch, PartDemandPatch, ToolPatch,
};
pub use service::{BuildView, NewBuildAttachment, TemplateBuilder};
