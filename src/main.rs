use std::net::SocketAddr;
use std::path::PathBuf;

use distributed_filestore::config::{NodeConfig, PeerTable};
use distributed_filestore::protocol::types::NodeRole;
use distributed_filestore::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut role: Option<NodeRole> = None;
    let mut bind: Option<SocketAddr> = None;
    let mut storage_root: Option<PathBuf> = None;
    let mut text_peer: Option<SocketAddr> = None;
    let mut pdf_peer: Option<SocketAddr> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--role" => {
                role = Some(parse_role(&args[i + 1])?);
                i += 2;
            }
            "--bind" => {
                bind = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--root" => {
                storage_root = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--text-peer" => {
                text_peer = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--pdf-peer" => {
                pdf_peer = Some(args[i + 1].parse()?);
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let (Some(role), Some(bind), Some(storage_root)) = (role, bind, storage_root) else {
        eprintln!(
            "Usage: {} --role <front|text|pdf> --bind <addr:port> --root <dir> \
             [--text-peer <addr:port>] [--pdf-peer <addr:port>]",
            args[0]
        );
        eprintln!(
            "Example: {} --role front --bind 127.0.0.1:7139 --root /srv/store/front \
             --text-peer 127.0.0.1:7114 --pdf-peer 127.0.0.1:7115",
            args[0]
        );
        eprintln!(
            "Example: {} --role text --bind 127.0.0.1:7114 --root /srv/store/text",
            args[0]
        );
        std::process::exit(1);
    };

    let peers = match role {
        NodeRole::Front => {
            let (Some(text), Some(pdf)) = (text_peer, pdf_peer) else {
                eprintln!("The front role requires --text-peer and --pdf-peer");
                std::process::exit(1);
            };
            Some(PeerTable { text, pdf })
        }
        _ => None,
    };

    tracing::info!(%role, %bind, root = %storage_root.display(), "starting node");

    let config = NodeConfig {
        role,
        bind,
        storage_root,
        peers,
    };

    let server = Server::bind(config).await?;
    server.run().await
}

fn parse_role(value: &str) -> anyhow::Result<NodeRole> {
    match value {
        "front" => Ok(NodeRole::Front),
        "text" => Ok(NodeRole::TextStore),
        "pdf" => Ok(NodeRole::DocStore),
        other => anyhow::bail!("unknown role '{other}' (expected front, text or pdf)"),
    }
}
