//! # doxtree-engine
//!
//! Turns documentation comments plus externally parsed declarations into a
//! resolved [`DocumentationModel`].
//!
//! ## Pipeline
//!
//! ```text
//! SourceFile ─ bind_file ─▶ FileUnit      (per file, parallel)
//! FileUnit*  ─ GroupBuilder::fold ─▶ groups, symbols, files   (file order)
//! model      ─ resolve ─▶ @ref / @copydoc / @anchor resolved
//! ```
//!
//! ```
//! use doxtree_engine::{Options, SourceEntry, SourceFile, SymbolDecl, SymbolKind, build_model};
//!
//! let file = SourceFile::new("Test.c")
//!     .entry(
//!         SourceEntry::declaration(SymbolDecl::new(SymbolKind::Function, "F"))
//!             .preceded_by("/** @defgroup X Title @{ @file */"),
//!     )
//!     .entry(SourceEntry::comment("/// @}"));
//!
//! let model = build_model(&[file], &Options::default());
//! let x = model.group_by_name("X").unwrap();
//! assert_eq!(model.member_names(x), ["F"]);
//! ```

pub mod binding;
pub mod diagnostics;
pub mod groups;
pub mod model;
pub mod parsing;
pub mod pipeline;
pub mod resolve;

pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use doxtree_config::{BriefMode, Options};
pub use model::{
    AnchorDef, DocBlock, DocumentationModel, FileDoc, FileId, Group, GroupId, GroupMember,
    MarkupNode, RefState, SourceEntry, SourceFile, Symbol, SymbolDecl, SymbolId, SymbolKind,
    TargetId,
};
pub use pipeline::build_model;
