pub mod log;
pub mod messages;
pub mod producer;

pub use log::LogEmailDispatcher;
pub use producer::KafkaEmailDispatcher;
