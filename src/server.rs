use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument, warn};

use crate::commands::executable::Executable;
use crate::commands::Command;
use crate::config::Config;
use crate::connection::Connection;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;

    serve(listener, Store::new(), config.max_frame_size).await
}

/// Accepts connections on `listener` forever, sharing `store` between them.
pub async fn serve(listener: TcpListener, store: Store, max_frame_size: usize) -> Result<(), Error> {
    info!("Server listening on {}", listener.local_addr()?);

    loop {
        let (socket, client_address) = listener.accept().await?;
        let store = store.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, store, max_frame_size).await
            {
                error!("Connection failed: {}", e);
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, store, max_frame_size),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    store: Store,
    max_frame_size: usize,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream, max_frame_size);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    loop {
        let frame = match conn.read_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                // The byte stream can't be resynchronised after a framing error.
                warn!("Invalid frame from client: {}", e);
                conn.write_frame(&Frame::Error(format!("ERR {}", e))).await?;
                return Err(e);
            }
        };

        debug!("Received frame from client: {}", frame);
        let res = respond(frame, store.clone());
        debug!("Sending response to client: {}", res);

        conn.write_frame(&res).await?;
    }

    info!("Connection closed");
    Ok(())
}

fn respond(frame: Frame, store: Store) -> Frame {
    Command::try_from(frame)
        .and_then(|cmd| cmd.exec(store))
        .unwrap_or_else(|e| {
            debug!("Command failed: {}", e);
            Frame::Error(format!("ERR {}", e))
        })
}
