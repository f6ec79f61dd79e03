pub mod block_quote;
pub mod command;
pub mod fence;
pub mod list;
pub mod table;

pub use block_quote::BlockQuote;
pub use command::Command;
pub use fence::{Fence, FenceKind};
pub use list::{ListMarker, ListMarkerKind};
pub use table::{Alignment, TableSyntax};
