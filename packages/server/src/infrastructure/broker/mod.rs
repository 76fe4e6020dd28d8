//! グループブローカーの実装
//!
//! - `inmemory`: 単一プロセス内の実装（プロセス間の中継は持たない）

pub mod inmemory;

pub use inmemory::InMemoryGroupBroker;
