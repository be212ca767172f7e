//! Interactive observer client.
//!
//! Connects to the anomaly-detection server, prints every broadcast line
//! (STATUS, ANTICHEAT, CHAT, query replies) and forwards stdin lines to the
//! server, e.g. `INVENTORY:Alice` or `CHAT:Watcher|hello`.

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server host to connect to
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    /// Server port
    #[clap(short, long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let stream = TcpStream::connect((args.host.as_str(), args.port)).await?;
    println!("Connected to {}", stream.peer_addr()?);
    let (reader, mut writer) = stream.into_split();

    let mut recv_task = tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            println!("{}", line);
        }
        println!("Server closed the connection");
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = &mut recv_task => break,
            line = stdin.next_line() => {
                match line? {
                    Some(line) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        writer.write_all(line.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                    }
                    None => break,
                }
            }
        }
    }

    Ok(())
}
