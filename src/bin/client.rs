//! Interactive client for the distributed file store.
//!
//! Connects to the front node, reads commands from stdin, validates them
//! locally (extension whitelist, namespace prefix, upload source exists)
//! and round-trips each one over the shared connection.

use std::io::Write;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;

use distributed_filestore::protocol::codec;
use distributed_filestore::protocol::types::{Command, Reply};
use distributed_filestore::routing::table;
use distributed_filestore::store::namespace;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut server: SocketAddr = "127.0.0.1:7139".parse()?;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--server" => {
                server = args[i + 1].parse()?;
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let stream = TcpStream::connect(server)
        .await
        .with_context(|| format!("failed to connect to front node at {server}"))?;
    println!("Connected to {}", server);

    let (read_half, mut write_half) = stream.into_split();
    let mut reply_reader = BufReader::new(read_half);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("filestore> ");
        std::io::stdout().flush()?;

        let Some(line) = input.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                println!("Commands: ufile <file> <~store/path>, dfile <path>, rmfile <path>, dtar <ext>, display <path>, exit");
                continue;
            }
        };

        if let Err(message) = validate(&command) {
            println!("{}", message);
            continue;
        }

        let payload = match &command {
            Command::Store { name, .. } => match tokio::fs::read(name).await {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    println!("cannot read '{}': {}", name, e);
                    continue;
                }
            },
            _ => None,
        };

        // The local source may live in a subdirectory; the stored name is
        // always its basename.
        let command = match command {
            Command::Store { name, dest } => Command::Store {
                name: namespace::basename(&name).to_string(),
                dest,
            },
            other => other,
        };

        codec::write_command(&mut write_half, &command).await?;
        if let Some(data) = payload {
            codec::write_payload(&mut write_half, &data).await?;
        }

        match codec::read_reply(&mut reply_reader).await? {
            Reply::Ok(message) => println!("OK: {}", message),
            Reply::Error(message) => println!("ERROR: {}", message),
            Reply::Data { name, bytes } => {
                let target = namespace::basename(&name).to_string();
                tokio::fs::write(&target, &bytes)
                    .await
                    .with_context(|| format!("failed to save '{target}'"))?;
                println!("Saved {} ({} bytes)", target, bytes.len());
            }
            Reply::Listing(files) => {
                if files.is_empty() {
                    println!("(no files)");
                } else {
                    for file in files {
                        println!("{}", file);
                    }
                }
            }
        }
    }

    Ok(())
}

/// Client-side checks, mirroring what the front node will enforce, so an
/// obviously bad command never leaves the prompt.
fn validate(command: &Command) -> Result<(), String> {
    match command {
        Command::Store { name, dest } => {
            table::route(name)
                .map_err(|_| "only .c, .txt or .pdf files can be uploaded".to_string())?;
            namespace::validate(dest).map_err(|e| e.to_string())?;
            if !std::path::Path::new(name).is_file() {
                return Err(format!("'{}' does not exist in the current directory", name));
            }
            Ok(())
        }
        Command::Retrieve { path } | Command::Delete { path } => {
            namespace::validate(path).map_err(|e| e.to_string())?;
            table::route(path).map_err(|e| e.to_string())?;
            Ok(())
        }
        Command::ListDirectory { path } => namespace::validate(path).map_err(|e| e.to_string()),
        Command::BuildArchive { extension } => table::owner_of_extension(extension)
            .map(|_| ())
            .map_err(|e| e.to_string()),
    }
}
