//! SOCKS5 method negotiation
//!
//! Only the "no authentication required" method is ever selected.

use crate::config::SocksConfig;
use crate::error::{RelayError, RelayResult};
use crate::helper::{hex, read_full};
use crate::socks::consts::*;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Client greeting as received on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    /// Protocol version byte (not validated)
    pub version: u8,
    /// Offered authentication methods
    pub methods: Vec<u8>,
}

impl Greeting {
    /// Whether the client offered "no authentication"
    pub fn offers_no_auth(&self) -> bool {
        self.methods.contains(&SOCKS5_AUTH_METHOD_NONE)
    }
}

/// Read the client greeting and reply with the selected method
///
/// ```text
/// +----+----------+----------+
/// |VER | NMETHODS | METHODS  |
/// +----+----------+----------+
/// | 1  |    1     | 1 to 255 |
/// +----+----------+----------+
/// ```
///
/// The greeting is framed by its declared method count. Fewer than three
/// bytes in total fails with `HandshakeTooShort`; EOF inside a longer
/// method list fails with `PeerClosed`.
///
/// The reply is always `05 00` unless `strict_methods` is set and the
/// client did not offer `0x00`, in which case `05 FF` is sent and the
/// negotiation fails.
pub async fn negotiate_method<S>(stream: &mut S, config: &SocksConfig) -> RelayResult<Greeting>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut header = [0u8; 2];
    if read_full(stream, &mut header).await? < header.len() {
        return Err(RelayError::HandshakeTooShort);
    }

    let num_methods = header[1] as usize;
    if num_methods == 0 {
        return Err(RelayError::HandshakeTooShort);
    }

    let mut methods = vec![0u8; num_methods];
    let got = read_full(stream, &mut methods).await?;
    if got < num_methods {
        return Err(if header.len() + got < MIN_HANDSHAKE_LEN {
            RelayError::HandshakeTooShort
        } else {
            RelayError::PeerClosed
        });
    }

    let greeting = Greeting {
        version: header[0],
        methods,
    };

    debug!(
        "Handshake: {}{}",
        hex(&header),
        hex(&greeting.methods)
    );

    if config.strict_methods && !greeting.offers_no_auth() {
        stream
            .write_all(&[SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE])
            .await?;
        stream.flush().await?;
        return Err(RelayError::NoAcceptableMethod);
    }

    stream
        .write_all(&[SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NONE])
        .await?;
    stream.flush().await?;

    Ok(greeting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncReadExt};

    async fn run_handshake(
        input: &[u8],
        config: SocksConfig,
    ) -> (RelayResult<Greeting>, Vec<u8>) {
        let (mut client, mut server) = duplex(1024);
        client.write_all(input).await.unwrap();
        client.shutdown().await.unwrap();

        let result = negotiate_method(&mut server, &config).await;
        drop(server);

        let mut reply = Vec::new();
        client.read_to_end(&mut reply).await.unwrap();
        (result, reply)
    }

    #[tokio::test]
    async fn test_no_auth_offered() {
        let (result, reply) = run_handshake(&[0x05, 0x01, 0x00], SocksConfig::default()).await;
        let greeting = result.unwrap();
        assert_eq!(greeting.version, 0x05);
        assert_eq!(greeting.methods, vec![0x00]);
        assert_eq!(reply, vec![0x05, 0x00]);
    }

    #[tokio::test]
    async fn test_permissive_ignores_offered_methods() {
        let (result, reply) =
            run_handshake(&[0x05, 0x02, 0x01, 0x02], SocksConfig::default()).await;
        assert!(result.is_ok());
        assert_eq!(reply, vec![0x05, 0x00]);
    }

    #[tokio::test]
    async fn test_strict_rejects_without_no_auth() {
        let config = SocksConfig {
            strict_methods: true,
            ..Default::default()
        };
        let (result, reply) = run_handshake(&[0x05, 0x01, 0x02], config).await;
        assert!(matches!(result, Err(RelayError::NoAcceptableMethod)));
        assert_eq!(reply, vec![0x05, 0xFF]);
    }

    #[tokio::test]
    async fn test_strict_accepts_with_no_auth() {
        let config = SocksConfig {
            strict_methods: true,
            ..Default::default()
        };
        let (result, reply) = run_handshake(&[0x05, 0x02, 0x02, 0x00], config).await;
        assert!(result.is_ok());
        assert_eq!(reply, vec![0x05, 0x00]);
    }

    #[tokio::test]
    async fn test_empty_greeting() {
        let (result, reply) = run_handshake(&[], SocksConfig::default()).await;
        assert!(matches!(result, Err(RelayError::HandshakeTooShort)));
        assert!(reply.is_empty());
    }

    #[tokio::test]
    async fn test_short_greeting() {
        let (result, reply) = run_handshake(&[0x05, 0x01], SocksConfig::default()).await;
        assert!(matches!(result, Err(RelayError::HandshakeTooShort)));
        assert!(reply.is_empty());

        let (result, _) = run_handshake(&[0x05, 0x00], SocksConfig::default()).await;
        assert!(matches!(result, Err(RelayError::HandshakeTooShort)));
    }

    #[tokio::test]
    async fn test_truncated_method_list() {
        let (result, reply) = run_handshake(&[0x05, 0x03, 0x00], SocksConfig::default()).await;
        assert!(matches!(result, Err(RelayError::PeerClosed)));
        assert!(reply.is_empty());
    }

    #[tokio::test]
    async fn test_fragmented_greeting() {
        let (mut client, mut server) = duplex(1024);
        let handle = tokio::spawn(async move {
            let config = SocksConfig::default();
            negotiate_method(&mut server, &config).await
        });

        client.write_all(&[0x05]).await.unwrap();
        tokio::task::yield_now().await;
        client.write_all(&[0x02, 0x00]).await.unwrap();
        tokio::task::yield_now().await;
        client.write_all(&[0x02]).await.unwrap();

        let mut reply = [0u8; 2];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, [0x05, 0x00]);

        let greeting = handle.await.unwrap().unwrap();
        assert_eq!(greeting.methods, vec![0x00, 0x02]);
    }
}
