pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod process;
pub mod session;

pub use config::Config;
pub use dashboard::Dashboard;
pub use process::{resolve, ResolvedTable};
pub use session::{query, Dataset, Series, Session, TimeRange};
