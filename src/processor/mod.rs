mod command_processor;
mod processor;

pub use command_processor::CommandProcessor;
pub use processor::{Processor, ProcessorError};
