//! End-to-end integration tests
//!
//! These tests start a real server on an ephemeral port with the demo accounts
//! installed and drive it through `LedgerClient` over TCP. Each test:
//! 1. Binds a fresh server on 127.0.0.1:0
//! 2. Connects one or more clients
//! 3. Sends requests and compares the response text
//! 4. Shuts the server down through its cancellation token

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_bank_server::net::END_MARKER;
    use rust_bank_server::{Config, LedgerClient, LedgerServer};
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::task::JoinHandle;
    use tokio_util::sync::CancellationToken;

    struct TestServer {
        addr: SocketAddr,
        shutdown: CancellationToken,
        handle: JoinHandle<()>,
    }

    impl TestServer {
        async fn stop(self) {
            self.shutdown.cancel();
            self.handle.await.expect("server task panicked");
        }
    }

    /// Start a seeded server with automatic interest disabled
    async fn start_server() -> TestServer {
        let config = Config {
            port: 0,
            auto_interest_interval: 0,
            ..Config::default()
        };
        let server = LedgerServer::bind(&config).await.expect("bind failed");
        let addr = server.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let handle = tokio::spawn(async move {
            server.run(token).await.expect("server failed");
        });
        TestServer {
            addr,
            shutdown,
            handle,
        }
    }

    async fn client(server: &TestServer) -> LedgerClient {
        LedgerClient::connect(server.addr).await.expect("connect failed")
    }

    #[rstest]
    #[case::deposit(
        "user=Alice command=deposit acct_num=1001 amount=500",
        "Successfully deposited 500 dollars into account 1001, current balance is 2600 dollars"
    )]
    #[case::withdraw_insufficient(
        "user=Alice command=withdraw acct_num=1001 amount=5000",
        "The account balance is insufficient and the current balance is 2100"
    )]
    #[case::transfer(
        "user=Alice command=transfer_to acct_num=1003 amount=500",
        "Alice successfully transferred 500 dollars from account 1001 to account 1003. \
         Current balance for source account is 1600 and target account is 4000."
    )]
    #[case::apply_interest(
        "user=Audit command=apply_interest acct_num=0",
        "Interest applied to all loan accounts."
    )]
    #[case::malformed("user=Alice command=deposit", "Invalid request format.")]
    #[case::unknown_command("user=Alice command=fly acct_num=1001", "Invalid command.")]
    #[case::not_found(
        "user=Alice command=deposit acct_num=4242 amount=5",
        "The account number was not found"
    )]
    #[case::auditor_only(
        "user=Alice command=show_bank acct_num=0",
        "Access denied: only Audit can view all bank accounts"
    )]
    #[tokio::test]
    async fn test_single_request(#[case] request: &str, #[case] expected: &str) {
        let server = start_server().await;
        let mut client = client(&server).await;

        let response = client.send_raw(request).await.unwrap();
        assert_eq!(response, expected);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_seed_scenarios_on_one_connection() {
        let server = start_server().await;
        let mut client = client(&server).await;

        client
            .send_raw("user=Alice command=withdraw acct_num=1001 amount=5000")
            .await
            .unwrap();
        let balance = client
            .send_raw("user=Alice command=deposit acct_num=1001 amount=0")
            .await
            .unwrap();
        assert_eq!(balance, "The current balance for account 1001 is 2100 dollars");

        client
            .send_raw("user=Audit command=apply_interest acct_num=0")
            .await
            .unwrap();
        let history = client
            .send_raw("user=Alice command=show_history acct_num=1002")
            .await
            .unwrap();
        assert_eq!(
            history,
            "The operation history of account 1002 is \n(System, interest, -15)"
        );
        let loan = client
            .send_raw("user=Alice command=pay_loan_check acct_num=1002 amount=15")
            .await
            .unwrap();
        assert_eq!(
            loan,
            "Alice successfully paid 15 dollars to account 1002. Current loan is -300"
        );

        server.stop().await;
    }

    #[tokio::test]
    async fn test_session_survives_bad_requests() {
        let server = start_server().await;
        let mut client = client(&server).await;

        for bad in ["garbage", "user=Alice command=rob acct_num=1001", "user=Alice"] {
            let response = client.send_raw(bad).await.unwrap();
            assert!(
                response == "Invalid request format." || response == "Invalid command.",
                "unexpected response {:?}",
                response
            );
        }
        let response = client
            .send_raw("user=Alice command=show_accountholders acct_num=1001")
            .await
            .unwrap();
        assert_eq!(
            response,
            "All the account holders for account 1001 are: Alice, Jason, David"
        );

        server.stop().await;
    }

    #[tokio::test]
    async fn test_create_account_then_use_it() {
        let server = start_server().await;
        let mut client = client(&server).await;

        let created = client
            .send_raw("user=Zoe command=create_account acct_num=2001 amount=100")
            .await
            .unwrap();
        assert_eq!(
            created,
            "Successfully created checking account for Zoe with account number 2001."
        );
        let transferred = client
            .send_raw("user=Zoe command=transfer_to acct_num=1001 amount=40")
            .await
            .unwrap();
        assert_eq!(
            transferred,
            "Zoe successfully transferred 40 dollars from account 2001 to account 1001. \
             Current balance for source account is 60 and target account is 2140."
        );
        let again = client
            .send_raw("user=Zoe command=create_account acct_num=2002")
            .await
            .unwrap();
        assert_eq!(again, "One person can only create one account");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_owner_name_containing_sentinel_text() {
        let server = start_server().await;
        let mut client = client(&server).await;

        let created = client
            .send_raw("user=LEGEND command=create_account acct_num=2001 amount=10")
            .await
            .unwrap();
        assert_eq!(
            created,
            "Successfully created checking account for LEGEND with account number 2001."
        );
        let holders = client
            .send_raw("user=Alice command=show_accountholders acct_num=1001")
            .await
            .unwrap();
        assert_eq!(
            holders,
            "All the account holders for account 1001 are: Alice, Jason, David"
        );

        server.stop().await;
    }

    #[tokio::test]
    async fn test_show_bank_round_trip() {
        let server = start_server().await;
        let mut client = client(&server).await;

        let table = client
            .send_raw("user=Audit command=show_bank acct_num=0")
            .await
            .unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "All account information is as follows:");
        assert!(lines[1].starts_with("acct_num"));
        assert_eq!(lines.len(), 2 + 56);
        assert!(lines[2].starts_with("1001"));
        assert!(lines[57].starts_with("1056"));
        assert!(!table.ends_with("END"));

        // Nothing from the table may leak into the next response
        let balance = client
            .send_raw("user=Alice command=deposit acct_num=1001 amount=0")
            .await
            .unwrap();
        assert_eq!(balance, "The current balance for account 1001 is 2100 dollars");

        server.stop().await;
    }

    #[tokio::test]
    async fn test_changes_are_visible_across_connections() {
        let server = start_server().await;
        let mut alice = client(&server).await;
        let mut jason = client(&server).await;

        alice
            .send_raw("user=Alice command=deposit acct_num=1001 amount=900")
            .await
            .unwrap();
        let response = jason
            .send_raw("user=Jason command=withdraw acct_num=1001 amount=3000")
            .await
            .unwrap();
        assert_eq!(
            response,
            "Jason successfully withdrew 3000 dollars from account 1001. Current balance is 0"
        );

        server.stop().await;
    }

    #[tokio::test]
    async fn test_raw_socket_sees_sentinel() {
        let server = start_server().await;
        let mut stream = TcpStream::connect(server.addr).await.unwrap();

        stream
            .write_all(b"user=Alice command=show_accountholders acct_num=1002")
            .await
            .unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        while !received.ends_with(END_MARKER) {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "server closed before sending END");
            received.extend_from_slice(&buf[..n]);
        }
        assert_eq!(
            String::from_utf8(received).unwrap(),
            "All the account holders for account 1002 are: Alice, Jason, DavidEND"
        );

        server.stop().await;
    }

    #[tokio::test]
    async fn test_shutdown_closes_open_sessions() {
        let server = start_server().await;
        let mut client = client(&server).await;
        client
            .send_raw("user=Alice command=deposit acct_num=1001 amount=0")
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(5), server.stop())
            .await
            .expect("server did not stop");

        assert!(client
            .send_raw("user=Alice command=deposit acct_num=1001 amount=0")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_connect_with_retry_gives_up() {
        // Bind and drop to get a port nothing listens on
        let addr = {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let result = LedgerClient::connect_with_retry(addr, 2, Duration::from_millis(10)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_connect_with_retry_succeeds() {
        let server = start_server().await;

        let mut client = LedgerClient::connect_with_retry(server.addr, 3, Duration::from_millis(10))
            .await
            .unwrap();
        let response = client
            .send(&rust_bank_server::Request::new(
                "Bob",
                rust_bank_server::Command::ShowAccountHolders,
                1003,
            ))
            .await
            .unwrap();
        assert_eq!(
            response,
            "All the account holders for account 1003 are: Bob, Ivan, Kevin"
        );

        server.stop().await;
    }
}
