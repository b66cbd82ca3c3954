// MIT License - Copyright (c) 2026 hekit authors

use std::fmt;

use crate::error::Result;

/// Capability contract for access to a deployment's data layer.
///
/// Every data-access backend a deployment plugs in must provide these five
/// operations. The trait deliberately fixes no call ordering, no data shape
/// and no transport: an implementation holds its own buffers and documents
/// its own sequencing requirements. Cleanup on destruction is expressed
/// through `Drop` on the concrete type and runs when a
/// [`DataConnectionHandle`] goes out of scope.
pub trait DataConnection: Send {
    /// Establish access to the data layer.
    fn connect(&mut self) -> Result<()>;

    /// Release access established by `connect`.
    fn disconnect(&mut self) -> Result<()>;

    /// Read in data.
    fn read(&mut self) -> Result<()>;

    /// Write out data.
    fn write(&mut self) -> Result<()>;

    /// Process data.
    fn process(&mut self) -> Result<()>;
}

/// Abstract handle to a data connection.
///
/// All five operations dispatch through this handle, and dropping it runs
/// the concrete implementation's cleanup.
pub type DataConnectionHandle = Box<dyn DataConnection>;

/// The five operations of the data-connection contract.
///
/// Used for error reporting and logging so failures name the operation
/// they occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionOp {
    Connect,
    Disconnect,
    Read,
    Write,
    Process,
}

impl ConnectionOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Read => "read",
            Self::Write => "write",
            Self::Process => "process",
        }
    }
}

impl fmt::Display for ConnectionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
