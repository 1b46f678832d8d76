//! The library code for the `sitestack` static site builder. A build walks the
//! source tree twice:
//!
//! 1. Gathering metadata from manifests and front matter into a
//!    [`stack::Stack`] ([`crate::gather`])
//! 2. Rendering content files and copying everything else into the target
//!    tree ([`crate::transform`])
//!
//! The interesting part is the stack. Every piece of metadata is scoped to a
//! directory or a file, and a file sees the deep merge of every fragment
//! scoped to it or to one of its ancestor directories, with more specific
//! fragments overriding less specific ones. A `site.json` at the root can
//! declare a default `template`, a `blog/site.json` can override it for the
//! blog, and a post's own front matter can override it again.
//!
//! The gather pass must finish before the transform pass starts, because a
//! directory's manifest may be visited after some of the files it applies
//! to. [`stack::StackBuilder::finish`] marks that boundary.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod frontmatter;
pub mod gather;
pub mod kind;
pub mod link;
pub mod markdown;
pub mod stack;
pub mod template;
pub mod transform;
pub mod value;
