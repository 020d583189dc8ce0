mod server;
mod tools;

pub use server::CortexRecallMcpServer;
pub use tools::*;
