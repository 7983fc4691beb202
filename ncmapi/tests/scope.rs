//! Logout-on-exit guarantees.

mod common;

use common::{Reply, StubGateway};
use ncmapi::{ApiClient, Args, NcmApiError, Result};
use std::panic;

fn failing_scope(port: u16) -> Result<()> {
    let api = ApiClient::new(port, "127.0.0.1")?;
    api.call_api("/fail", Args::new(), false)?;
    unreachable!("/fail always errors");
}

#[test]
fn early_error_return_still_logs_out_once() {
    let stub = StubGateway::standard();
    let err = failing_scope(stub.port).unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(stub.count("/logout"), 1);
}

#[test]
fn panic_unwinding_still_logs_out_once() {
    let stub = StubGateway::standard();
    let port = stub.port;
    let result = panic::catch_unwind(move || {
        let api = ApiClient::new(port, "127.0.0.1").unwrap();
        api.banner(Args::new()).unwrap();
        panic!("caller bug");
    });
    assert!(result.is_err());
    assert_eq!(stub.count("/logout"), 1);
}

#[test]
fn explicit_close_then_drop_logs_out_once() {
    let stub = StubGateway::standard();
    let mut api = ApiClient::new(stub.port, "127.0.0.1").unwrap();
    api.close();
    api.close();
    drop(api);
    assert_eq!(stub.count("/logout"), 1);
}

#[test]
fn failing_logout_is_swallowed() {
    let stub = StubGateway::start(|path| match path {
        "/logout" => Reply::status(500, r#"{"code":500}"#),
        _ => Reply::json(r#"{"code":200}"#),
    });
    {
        let api = ApiClient::new(stub.port, "127.0.0.1").unwrap();
        let err = api.logout(Args::new()).unwrap_err();
        assert!(matches!(err, NcmApiError::HttpStatus { status: 500, .. }));
    }
    // one explicit call, one from drop; neither escaped
    assert_eq!(stub.count("/logout"), 2);
}
