//! A small interactive client for talking to a LatticeDB server: send a
//! line, print the one reply it produces.

use clap::Parser;
use std::io::{self, BufRead, Write};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[derive(Parser, Debug)]
#[command(author, version, about = "Interactive client for a LatticeDB server")]
struct Args {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = 6379)]
    port: u16,
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);
    let stream = TcpStream::connect(&addr).await?;
    println!("connected to {}", addr);

    let (read_half, mut write_half) = stream.into_split();
    let mut server_reader = BufReader::new(read_half);

    let stdin = io::stdin();
    loop {
        print!("latticedb> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }

        write_half.write_all(line.as_bytes()).await?;
        write_half.write_all(b"\n").await?;

        match read_reply(&mut server_reader).await? {
            Some(reply) => println!("{}", reply),
            None => {
                println!("server closed the connection");
                break;
            }
        }
    }

    Ok(())
}

/// Read and render exactly one reply: a simple string/error/integer line,
/// or a null/array reply spanning a couple of lines.
async fn read_reply<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    let line = line.trim_end();

    match line.chars().next() {
        Some('+') => Ok(Some(line[1..].to_string())),
        Some('-') => Ok(Some(format!("(error) {}", &line[1..]))),
        Some(':') => Ok(Some(format!("(integer) {}", &line[1..]))),
        Some('$') => Ok(Some("(nil)".to_string())),
        Some('*') => {
            let count: usize = line[1..].parse().unwrap_or(0);
            let mut items = Vec::with_capacity(count);
            for i in 0..count {
                let mut item_line = String::new();
                reader.read_line(&mut item_line).await?;
                let item_line = item_line.trim_end();
                let value = item_line.strip_prefix('+').unwrap_or(item_line);
                items.push(format!("{}) {}", i + 1, value));
            }
            Ok(Some(items.join("\n")))
        }
        _ => Ok(Some(line.to_string())),
    }
}

