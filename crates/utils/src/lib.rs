mod logger;

pub use logger::{LoggerManager, ORACLE_TARGET, TRADE_TARGET};
