pub mod analyze;
pub mod cli;
pub mod init;
pub mod logging;
pub mod table_io;
