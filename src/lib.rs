pub mod accounts;
pub mod cmd;
pub mod config;
pub mod error;
pub mod keyfile;
pub mod logging;
pub mod paths;
pub mod systeminfo;
pub mod textconf;
pub mod util;

pub use error::{Error, Result};
