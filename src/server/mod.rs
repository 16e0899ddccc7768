pub mod actor;
pub mod commands;
pub mod registry;
pub mod subscription;

pub use actor::TableHandle;
pub use commands::{Ack, TableCommand};
pub use registry::{CreateTable, TableRegistry};
pub use subscription::EventStream;
