//! The resolved documentation model handed to renderers.

pub mod doc;
pub mod documentation;
pub mod group;
pub mod markup;
pub mod source;
pub mod symbol;

pub use doc::{Admonition, AdmonitionKind, DocBlock, ParamDirection, ParamDoc, RetvalDoc};
pub use documentation::{AnchorDef, DocumentationModel, FileDoc, FileId, TargetId};
pub use group::{Group, GroupId, GroupMember};
pub use markup::{
    Alignment, BrokenReason, DefinitionEntry, Diagram, DiagramKind, DiagramSource, ListItem,
    MarkupNode, PassthroughKind, RefState, ResolvedRef, Table, TableCell, TableRow,
};
pub use source::{SourceEntry, SourceFile};
pub use symbol::{Symbol, SymbolDecl, SymbolId, SymbolKind};
