//! Layer engine for a virtual grid: a stack of small layers, each owning one
//! transformation of the rows and columns below it.

pub mod clipboard;
pub mod command;
pub mod composite_freeze;
pub mod data;
pub mod data_layer;
pub mod event;
pub mod fill;
pub mod filter;
pub mod freeze;
pub mod hide_show;
pub mod layer;
pub mod list;
pub mod reorder;
pub mod selection;
pub mod stack;
pub mod viewport;

pub use command::{CellUpdate, LayerCommand};
pub use composite_freeze::CompositeFreezeLayer;
pub use data::{ColumnAccessor, DataError, DataProvider, ListDataProvider, VecDataProvider};
pub use data_layer::DataLayer;
pub use event::{ChangeKind, EventCollector, LayerEvent, StructuralChange, StructuralDiff};
pub use hide_show::HideShowLayer;
pub use layer::Layer;
pub use list::{EventList, FilterList, ListChange, RowChangeQueue};
pub use reorder::ReorderLayer;
pub use selection::{SelectionLayer, SelectionModel};
pub use stack::BodyLayerStack;
