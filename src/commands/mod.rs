pub mod clean;
pub mod decrypt;
pub mod encrypt;
pub mod init;
pub mod list;

pub use clean::clean;
pub use decrypt::decrypt;
pub use encrypt::encrypt;
pub use init::init;
pub use list::list;
