pub mod directory;
pub mod lending_service;
pub mod session;
mod wire;

pub use directory::{Country, DirectoryClient, DirectoryError, LibraryBranch};
pub use lending_service::HttpLendingService;
pub use session::{Session, SessionConfig, SessionError};
