use std::fmt;
use thiserror::Error;

/// Identifies which cluster role a node plays.
///
/// Each role owns exactly one extension class: the front node stores `.c`
/// files and routes everything else, the two specialists each store their
/// own class and are only reachable through the front node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Front,
    TextStore,
    DocStore,
}

impl NodeRole {
    /// The file extension class this role owns (without the leading dot).
    pub fn owned_extension(&self) -> &'static str {
        match self {
            NodeRole::Front => "c",
            NodeRole::TextStore => "txt",
            NodeRole::DocStore => "pdf",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Front => "front",
            NodeRole::TextStore => "text",
            NodeRole::DocStore => "pdf",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single client command, parsed from one text line of the wire protocol.
///
/// `Store` is the only variant followed by a framed payload on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Store { name: String, dest: String },
    Retrieve { path: String },
    Delete { path: String },
    ListDirectory { path: String },
    BuildArchive { extension: String },
}

impl Command {
    /// Parses a command line of the shape `<verb> <arg1> [arg2]`.
    pub fn parse(line: &str) -> Result<Command, ProtocolError> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or("");
        let args: Vec<&str> = parts.collect();

        match verb {
            "ufile" => match args.as_slice() {
                [name, dest] => Ok(Command::Store {
                    name: name.to_string(),
                    dest: dest.to_string(),
                }),
                _ => Err(ProtocolError::WrongArgCount {
                    verb: "ufile",
                    expected: 2,
                }),
            },
            "dfile" => match args.as_slice() {
                [path] => Ok(Command::Retrieve {
                    path: path.to_string(),
                }),
                _ => Err(ProtocolError::WrongArgCount {
                    verb: "dfile",
                    expected: 1,
                }),
            },
            "rmfile" => match args.as_slice() {
                [path] => Ok(Command::Delete {
                    path: path.to_string(),
                }),
                _ => Err(ProtocolError::WrongArgCount {
                    verb: "rmfile",
                    expected: 1,
                }),
            },
            "display" => match args.as_slice() {
                [path] => Ok(Command::ListDirectory {
                    path: path.to_string(),
                }),
                _ => Err(ProtocolError::WrongArgCount {
                    verb: "display",
                    expected: 1,
                }),
            },
            "dtar" => match args.as_slice() {
                [extension] => Ok(Command::BuildArchive {
                    extension: extension.to_string(),
                }),
                _ => Err(ProtocolError::WrongArgCount {
                    verb: "dtar",
                    expected: 1,
                }),
            },
            other => Err(ProtocolError::UnknownVerb(other.to_string())),
        }
    }

    /// Renders the command back into its wire line (without the newline).
    pub fn encode(&self) -> String {
        match self {
            Command::Store { name, dest } => format!("ufile {} {}", name, dest),
            Command::Retrieve { path } => format!("dfile {}", path),
            Command::Delete { path } => format!("rmfile {}", path),
            Command::ListDirectory { path } => format!("display {}", path),
            Command::BuildArchive { extension } => format!("dtar {}", extension),
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Command::Store { .. } => "ufile",
            Command::Retrieve { .. } => "dfile",
            Command::Delete { .. } => "rmfile",
            Command::ListDirectory { .. } => "display",
            Command::BuildArchive { .. } => "dtar",
        }
    }
}

/// Errors raised while decoding the wire protocol itself.
///
/// These are connection-local: the handler answers with an `ERROR:` line and
/// either continues (bad command line) or drops the connection (the byte
/// stream is desynchronized, e.g. a truncated payload).
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unrecognized command '{0}'")]
    UnknownVerb(String),

    #[error("wrong argument count for '{verb}' (expected {expected})")]
    WrongArgCount { verb: &'static str, expected: usize },

    #[error("malformed frame header '{0}'")]
    BadFrameHeader(String),

    #[error("connection closed before the declared length was satisfied")]
    IncompleteTransfer,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the file operations themselves, shared by every node role.
///
/// The wire representation of each variant is the `ERROR:`-prefixed status
/// line the client sees; callers distinguish errors from data solely by that
/// prefix.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid path '{0}': not under the shared namespace root")]
    InvalidPath(String),

    #[error("unsupported file type '{0}'")]
    UnsupportedFileType(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("'{0}' is a directory")]
    IsDirectory(String),

    #[error("failed to write '{0}': {1}")]
    WriteFailed(String, String),

    #[error("node '{0}' unavailable")]
    RemoteUnavailable(NodeRole),

    #[error("no '{0}' files found")]
    NoMatchingFiles(String),

    #[error("no files found")]
    NoFilesFound,

    #[error("archive build failed: {0}")]
    BuildFailed(String),

    #[error("i/o error on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// One response on the wire, in either direction of a forwarded request.
///
/// `Error` carries the remote's message verbatim so the front node can relay
/// a backend failure to the client unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok(String),
    Error(String),
    Data { name: String, bytes: Vec<u8> },
    Listing(Vec<String>),
}
