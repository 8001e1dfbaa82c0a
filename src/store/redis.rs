//! Minimal RESP2 client over a redis Unix socket. Only the two commands the
//! push endpoint needs (SETEX, HSET), one connection behind a mutex, re-dialed
//! lazily after any I/O failure.

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufStream};
use tokio::net::UnixStream;
use tokio::sync::Mutex;

use crate::store::{KvStore, StoreError};

const TERMINATOR: &[u8] = b"\r\n";

pub struct RedisStore {
    socket_path: PathBuf,
    conn: Mutex<Option<BufStream<UnixStream>>>,
}

impl RedisStore {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            conn: Mutex::new(None),
        }
    }

    /// Encode a command as a RESP array of bulk strings.
    fn encode_command(args: &[&[u8]]) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_u8(b'*');
        buf.put_slice(args.len().to_string().as_bytes());
        buf.put_slice(TERMINATOR);
        for arg in args {
            buf.put_u8(b'$');
            buf.put_slice(arg.len().to_string().as_bytes());
            buf.put_slice(TERMINATOR);
            buf.put_slice(arg);
            buf.put_slice(TERMINATOR);
        }
        buf
    }

    /// Send one command and read its reply. On any I/O error the connection is
    /// dropped so the next call dials a fresh one.
    async fn command(&self, args: &[&[u8]]) -> Result<(), StoreError> {
        let mut guard = self.conn.lock().await;
        if guard.is_none() {
            let stream = UnixStream::connect(&self.socket_path).await?;
            *guard = Some(BufStream::new(stream));
        }
        let Some(conn) = guard.as_mut() else {
            return Err(StoreError::Protocol("connection unavailable".to_string()));
        };

        let buf = Self::encode_command(args);
        let result = async {
            conn.write_all(&buf).await?;
            conn.flush().await?;
            Self::read_reply(conn).await
        }
        .await;

        if result.is_err() {
            *guard = None;
        }
        result
    }

    async fn read_reply(conn: &mut BufStream<UnixStream>) -> Result<(), StoreError> {
        let mut line = String::new();
        let n = conn.read_line(&mut line).await?;
        if n == 0 {
            return Err(StoreError::Protocol("connection closed by redis".to_string()));
        }
        let line = line.trim_end();
        match line.as_bytes().first() {
            Some(b'+') | Some(b':') => Ok(()),
            Some(b'-') => Err(StoreError::Protocol(line[1..].to_string())),
            Some(b'$') => {
                // Bulk reply: consume the payload, the content is irrelevant here
                let len: i64 = line[1..]
                    .parse()
                    .map_err(|_| StoreError::Protocol(format!("bad bulk length: {}", line)))?;
                if len >= 0 {
                    let mut payload = vec![0u8; len as usize + TERMINATOR.len()];
                    conn.read_exact(&mut payload).await?;
                }
                Ok(())
            }
            _ => Err(StoreError::Protocol(format!("unexpected reply: {}", line))),
        }
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn set_ex(&self, key: &str, value: Bytes, ttl_secs: u64) -> Result<(), StoreError> {
        self.command(&[
            b"SETEX",
            key.as_bytes(),
            ttl_secs.to_string().as_bytes(),
            &value,
        ])
        .await
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.command(&[b"HSET", key.as_bytes(), field.as_bytes(), value.as_bytes()])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_setex_as_resp_array() {
        let buf = RedisStore::encode_command(&[b"SETEX", b"k", b"90", b"XYZ"]);
        assert_eq!(
            &buf[..],
            b"*4\r\n$5\r\nSETEX\r\n$1\r\nk\r\n$2\r\n90\r\n$3\r\nXYZ\r\n"
        );
    }

    #[test]
    fn encodes_binary_payloads_verbatim() {
        let buf = RedisStore::encode_command(&[b"HSET", b"h", b"f", &[0u8, 1, 2]]);
        assert_eq!(
            &buf[..],
            b"*4\r\n$4\r\nHSET\r\n$1\r\nh\r\n$1\r\nf\r\n$3\r\n\x00\x01\x02\r\n"
        );
    }
}
