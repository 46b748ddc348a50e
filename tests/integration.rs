//! End-to-end tests driving a real `latticedb` server over loopback TCP,
//! exercising the scenarios from the design's testable-properties list.

use latticedb::db::core::Keyspace;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Mutex};

async fn start_server() -> (std::net::SocketAddr, watch::Sender<bool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let keyspace = Arc::new(Mutex::new(Keyspace::new()));
    let (tx, rx) = watch::channel(false);

    tokio::spawn(latticedb::server::run(listener, keyspace, 100, rx));

    (addr, tx)
}

async fn send(stream: &mut TcpStream, line: &str) -> String {
    stream.write_all(line.as_bytes()).await.unwrap();
    stream.write_all(b"\n").await.unwrap();

    let mut buf = vec![0u8; 4096];
    let n = stream.read(&mut buf).await.unwrap();
    String::from_utf8_lossy(&buf[..n]).to_string()
}

#[tokio::test]
async fn set_get_and_incr_scenario() {
    let (addr, _shutdown) = start_server().await;
    let mut client = TcpStream::connect(addr).await.unwrap();

    assert_eq!(send(&mut client, "SET name PyRedis").await, "+OK\r\n");
    assert_eq!(send(&mut client, "GET name").await, "+PyRedis\r\n");
    assert_eq!(send(&mut client, "SET counter 10").await, "+OK\r\n");
    assert_eq!(send(&mut client, "INCR counter").await, ":11\r\n");
}

#[tokio::test]
async fn list_push_range_pop_scenario() {
    let (addr, _shutdown) = start_server().await;
    let mut client = TcpStream::connect(addr).await.unwrap();

    assert_eq!(send(&mut client, "LPUSH mylist a b c").await, ":3\r\n");
    assert_eq!(
        send(&mut client, "LRANGE mylist 0 -1").await,
        "*3\r\n+c\r\n+b\r\n+a\r\n"
    );
    assert_eq!(send(&mut client, "RPOP mylist").await, "+a\r\n");
}

#[tokio::test]
async fn set_ops_scenario() {
    let (addr, _shutdown) = start_server().await;
    let mut client = TcpStream::connect(addr).await.unwrap();

    assert_eq!(
        send(&mut client, "SADD fruits apple banana cherry").await,
        ":3\r\n"
    );
    assert_eq!(send(&mut client, "SISMEMBER fruits apple").await, ":1\r\n");
    assert_eq!(send(&mut client, "SREM fruits banana").await, ":1\r\n");
    assert_eq!(send(&mut client, "SCARD fruits").await, ":2\r\n");
}

#[tokio::test]
async fn hash_fields_scenario() {
    let (addr, _shutdown) = start_server().await;
    let mut client = TcpStream::connect(addr).await.unwrap();

    assert_eq!(
        send(&mut client, "HSET user name John age 30 city NYC").await,
        ":3\r\n"
    );
    assert_eq!(send(&mut client, "HGET user name").await, "+John\r\n");

    let all = send(&mut client, "HGETALL user").await;
    assert!(all.starts_with("*6\r\n"));
}

#[tokio::test]
async fn expire_and_ttl_scenario() {
    let (addr, _shutdown) = start_server().await;
    let mut client = TcpStream::connect(addr).await.unwrap();

    assert_eq!(send(&mut client, "SET tmp x").await, "+OK\r\n");
    assert_eq!(send(&mut client, "EXPIRE tmp 1").await, ":1\r\n");

    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(send(&mut client, "GET tmp").await, "$-1\r\n");
    assert_eq!(send(&mut client, "TTL tmp").await, ":-2\r\n");
}

#[tokio::test]
async fn emptying_a_list_removes_the_key() {
    let (addr, _shutdown) = start_server().await;
    let mut client = TcpStream::connect(addr).await.unwrap();

    assert_eq!(send(&mut client, "LPUSH L a").await, ":1\r\n");
    assert_eq!(send(&mut client, "LPOP L").await, "+a\r\n");
    assert_eq!(send(&mut client, "EXISTS L").await, ":0\r\n");
}

#[tokio::test]
async fn unknown_command_and_wrong_arity_do_not_close_the_connection() {
    let (addr, _shutdown) = start_server().await;
    let mut client = TcpStream::connect(addr).await.unwrap();

    let reply = send(&mut client, "FROBNICATE").await;
    assert!(reply.starts_with("-ERR unknown command"));

    let reply = send(&mut client, "GET").await;
    assert!(reply.starts_with("-ERR wrong number of arguments"));

    assert_eq!(send(&mut client, "PING").await, "+PONG\r\n");
}

#[tokio::test]
async fn two_connections_share_one_keyspace() {
    let (addr, _shutdown) = start_server().await;
    let mut writer = TcpStream::connect(addr).await.unwrap();
    let mut reader = TcpStream::connect(addr).await.unwrap();

    assert_eq!(send(&mut writer, "SET shared v1").await, "+OK\r\n");
    assert_eq!(send(&mut reader, "GET shared").await, "+v1\r\n");
}

#[tokio::test]
async fn concurrent_incr_from_two_clients_is_serialized() {
    let (addr, _shutdown) = start_server().await;
    let mut setup = TcpStream::connect(addr).await.unwrap();
    assert_eq!(send(&mut setup, "SET c 0").await, "+OK\r\n");
    drop(setup);

    let incr_many = |addr: std::net::SocketAddr| async move {
        let mut client = TcpStream::connect(addr).await.unwrap();
        for _ in 0..1000 {
            send(&mut client, "INCR c").await;
        }
    };

    tokio::join!(incr_many(addr), incr_many(addr));

    let mut check = TcpStream::connect(addr).await.unwrap();
    assert_eq!(send(&mut check, "GET c").await, "+2000\r\n");
}

#[tokio::test]
async fn shutdown_stops_accepting_new_connections() {
    let (addr, shutdown_tx) = start_server().await;

    let mut client = TcpStream::connect(addr).await.unwrap();
    assert_eq!(send(&mut client, "PING").await, "+PONG\r\n");

    shutdown_tx.send(true).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(TcpStream::connect(addr).await.is_err());
}
