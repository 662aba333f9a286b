//! One request/response exchange with the gateway.
//!
//! A sender retransmits the request on the [`RetryController`] schedule while a
//! receiver waits for the answer. Both run as cooperating futures on the same
//! socket; whichever finishes first ends the exchange, and the whole race is
//! bounded by an absolute deadline.
//!
//! ```text
//! Idle -> Sending -> AwaitingResponse -> Accepted
//!                                     -> ProtocolFailure
//!                                     -> TimedOut
//!                                     -> Failed (socket error)
//! ```
//!
//! NAT-PMP has no transaction identifier. The first structurally valid
//! datagram from the gateway is taken as the answer, so callers must not run
//! two exchanges for the same gateway at once.

use std::convert::Infallible;
use std::future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::time;
use tracing::{debug, trace};

use super::error::{ExchangeError, ExchangeResult};
use super::retry::RetryController;
use super::socket::GatewaySocket;
use crate::core::CodecError;
use crate::core::constants::{DEFAULT_RECV_BUFFER_SIZE, OPERATION_TIMEOUT};

/// Lifecycle of an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// Not started.
    Idle,
    /// Opening the socket.
    Sending,
    /// Request sent at least once, waiting for the gateway.
    AwaitingResponse,
    /// A response was accepted.
    Accepted,
    /// The gateway answered with a failure.
    ProtocolFailure,
    /// The deadline passed without an accepted response.
    TimedOut,
    /// A socket error ended the exchange.
    Failed,
}

impl ExchangeState {
    /// Check if the exchange has finished.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExchangeState::Accepted
                | ExchangeState::ProtocolFailure
                | ExchangeState::TimedOut
                | ExchangeState::Failed
        )
    }
}

/// A single request/response exchange with a gateway.
#[derive(Debug)]
pub struct Exchange {
    gateway: SocketAddr,
    retry: RetryController,
    timeout: Duration,
    recv_buffer_size: usize,
    state: ExchangeState,
}

impl Exchange {
    /// Create an exchange with the default retry schedule and deadline.
    pub fn new(gateway: SocketAddr) -> Self {
        Self {
            gateway,
            retry: RetryController::default(),
            timeout: OPERATION_TIMEOUT,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
            state: ExchangeState::Idle,
        }
    }

    /// Set the retransmission schedule.
    pub fn retry(mut self, retry: RetryController) -> Self {
        self.retry = retry;
        self
    }

    /// Set the absolute deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the receive buffer size.
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    /// Get the current state.
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Get the number of times the request was sent.
    pub fn attempts(&self) -> u32 {
        self.retry.attempts()
    }

    /// Send `request` and wait for a datagram that `decode` accepts.
    ///
    /// Datagrams for which `decode` returns a silent-drop error are discarded
    /// and the wait continues. Any other decode error ends the exchange as a
    /// protocol failure. The socket is closed on every exit path.
    pub async fn run<T, D>(&mut self, request: &[u8], decode: D) -> ExchangeResult<T>
    where
        D: FnMut(&[u8]) -> Result<T, CodecError>,
    {
        let deadline = self.timeout;

        let result = match time::timeout(deadline, self.transact(request, decode)).await {
            Ok(result) => result,
            Err(_) => Err(ExchangeError::Timeout(deadline)),
        };

        self.state = match &result {
            Ok(_) => ExchangeState::Accepted,
            Err(ExchangeError::Protocol(_)) => ExchangeState::ProtocolFailure,
            Err(ExchangeError::Timeout(_)) => ExchangeState::TimedOut,
            Err(ExchangeError::Io(_)) => ExchangeState::Failed,
        };

        debug!(
            gateway = %self.gateway,
            attempts = self.retry.attempts(),
            exhausted = self.retry.is_exhausted(),
            state = ?self.state,
            "NAT-PMP exchange finished"
        );

        result
    }

    async fn transact<T, D>(&mut self, request: &[u8], mut decode: D) -> ExchangeResult<T>
    where
        D: FnMut(&[u8]) -> Result<T, CodecError>,
    {
        self.state = ExchangeState::Sending;
        self.retry.reset();

        debug!(
            gateway = %self.gateway,
            schedule = ?self.retry.total_delay(),
            deadline = ?self.timeout,
            "starting NAT-PMP exchange"
        );

        let socket = GatewaySocket::connect(self.gateway).await?;
        let mut buf = vec![0u8; self.recv_buffer_size];

        self.state = ExchangeState::AwaitingResponse;
        let retry = &mut self.retry;

        tokio::select! {
            result = receive(&socket, &mut buf, &mut decode) => result,
            result = retransmit(&socket, request, retry) => match result {
                Ok(never) => match never {},
                Err(e) => Err(e.into()),
            },
        }
    }
}

/// Send the request on the backoff schedule, then wait forever.
///
/// Only returns on a send error; otherwise it is cancelled when the receiver
/// wins the race or the deadline fires.
async fn retransmit(
    socket: &GatewaySocket,
    request: &[u8],
    retry: &mut RetryController,
) -> io::Result<Infallible> {
    while retry.should_send() {
        socket.send(request).await?;
        let delay = retry.on_attempt();

        debug!(
            gateway = %socket.gateway(),
            attempt = retry.attempts(),
            next_delay = ?delay,
            "sent NAT-PMP request"
        );

        time::sleep(delay).await;
    }

    debug!(gateway = %socket.gateway(), "retry attempts exhausted");
    future::pending().await
}

/// Receive until a datagram decodes or fails with a protocol error.
async fn receive<T, D>(
    socket: &GatewaySocket,
    buf: &mut [u8],
    decode: &mut D,
) -> ExchangeResult<T>
where
    D: FnMut(&[u8]) -> Result<T, CodecError>,
{
    loop {
        let datagram = socket.recv(buf).await?;

        match decode(datagram) {
            Ok(response) => return Ok(response),
            Err(e) if e.is_silent_drop() => {
                trace!(len = datagram.len(), reason = %e, "dropping datagram");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::UdpSocket;

    use super::*;
    use crate::codec::MapResponse;
    use crate::core::MappingProtocol;
    use crate::core::constants::RESULT_SUCCESS;

    fn quick(gateway: SocketAddr) -> Exchange {
        Exchange::new(gateway)
            .retry(RetryController::new(Duration::from_millis(20), 3))
            .timeout(Duration::from_millis(500))
    }

    fn reply(lifetime: u32) -> [u8; 16] {
        MapResponse {
            protocol: MappingProtocol::Udp,
            result_code: RESULT_SUCCESS,
            epoch: 7,
            private_port: 1234,
            public_port: 5678,
            lifetime,
        }
        .to_bytes()
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ExchangeState::Idle.is_terminal());
        assert!(!ExchangeState::Sending.is_terminal());
        assert!(!ExchangeState::AwaitingResponse.is_terminal());
        assert!(ExchangeState::Accepted.is_terminal());
        assert!(ExchangeState::ProtocolFailure.is_terminal());
        assert!(ExchangeState::TimedOut.is_terminal());
        assert!(ExchangeState::Failed.is_terminal());
    }

    #[tokio::test]
    async fn test_accepts_first_valid_response() {
        let gateway = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut exchange = quick(gateway.local_addr().unwrap());

        let responder = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (len, from) = gateway.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[..len], b"request");

            // Noise first: too short, then wrong version.
            gateway.send_to(&[0u8; 4], from).await.unwrap();
            let mut foreign = reply(3600);
            foreign[0] = 9;
            gateway.send_to(&foreign, from).await.unwrap();

            gateway.send_to(&reply(3600), from).await.unwrap();
        });

        assert_eq!(exchange.state(), ExchangeState::Idle);
        let response = exchange
            .run(b"request", MapResponse::from_bytes)
            .await
            .unwrap();
        responder.await.unwrap();

        assert_eq!(response.public_port, 5678);
        assert_eq!(response.lifetime, 3600);
        assert_eq!(exchange.state(), ExchangeState::Accepted);
    }

    #[tokio::test]
    async fn test_stops_sending_after_accept() {
        let gateway = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut exchange = Exchange::new(gateway.local_addr().unwrap())
            .retry(RetryController::new(Duration::from_millis(200), 5))
            .timeout(Duration::from_secs(2));

        let responder = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (_, from) = gateway.recv_from(&mut buf).await.unwrap();
            gateway.send_to(&reply(60), from).await.unwrap();
        });

        exchange
            .run(b"request", MapResponse::from_bytes)
            .await
            .unwrap();
        responder.await.unwrap();

        assert_eq!(exchange.attempts(), 1);
    }

    #[tokio::test]
    async fn test_protocol_failure_is_surfaced() {
        let gateway = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut exchange = quick(gateway.local_addr().unwrap());

        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (_, from) = gateway.recv_from(&mut buf).await.unwrap();
            let mut failure = reply(0);
            failure[3] = 4;
            gateway.send_to(&failure, from).await.unwrap();
        });

        let err = exchange
            .run(b"request", MapResponse::from_bytes)
            .await
            .unwrap_err();

        assert!(err.is_protocol_failure());
        assert_eq!(err.result_code(), Some(4));
        assert_eq!(exchange.state(), ExchangeState::ProtocolFailure);
    }

    #[tokio::test]
    async fn test_times_out_with_attempts_remaining() {
        let gateway = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut exchange = Exchange::new(gateway.local_addr().unwrap())
            .retry(RetryController::new(Duration::from_millis(50), 100))
            .timeout(Duration::from_millis(300));

        let err = exchange
            .run(b"request", MapResponse::from_bytes)
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(!err.is_protocol_failure());
        assert_eq!(exchange.state(), ExchangeState::TimedOut);
        assert!(exchange.attempts() < 100);

        drop(gateway);
    }

    #[tokio::test]
    async fn test_retransmits_until_answered() {
        let gateway = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut exchange = quick(gateway.local_addr().unwrap());

        let responder = tokio::spawn(async move {
            let mut buf = [0u8; 64];
            // Ignore the first two transmissions.
            gateway.recv_from(&mut buf).await.unwrap();
            gateway.recv_from(&mut buf).await.unwrap();
            let (_, from) = gateway.recv_from(&mut buf).await.unwrap();
            gateway.send_to(&reply(60), from).await.unwrap();
        });

        exchange
            .run(b"request", MapResponse::from_bytes)
            .await
            .unwrap();
        responder.await.unwrap();

        assert_eq!(exchange.attempts(), 3);
    }
}
