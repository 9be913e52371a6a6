//! Collection tree model and its synchronization with a remote resource store.
//!
//! The tree itself ([`tree`]) is plain data transformed by pure functions; [`sync`] is the only
//! place where the tree meets the network, through the [`store::ResourceStore`] trait.

pub mod cascade;
pub mod codec;
pub mod compose;
pub mod editor;
pub mod filter;
pub mod ids;
pub mod selection;
pub mod state;
pub mod store;
pub mod sync;
pub mod tree;

pub use codec::{flatten, unflatten, FlatFile, FlatRecord};
pub use store::{ResourceStore, StoreError};
pub use sync::{SyncController, SyncError};
pub use tree::{CollectionNode, FileRef, ItemKind, TreeError};
