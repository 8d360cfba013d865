//! Retry timing and logging of the request pipeline, observed through a
//! recording sleeper instead of real waits.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use coc_core::{
    ApiError, ClientConfig, CocClient, HttpRequest, HttpResponse, Paging, Sleeper, Transport,
    TransportError,
};

struct Scripted {
    outcomes: Mutex<Vec<Result<HttpResponse, TransportError>>>,
    calls: Mutex<usize>,
}

impl Scripted {
    fn new(mut outcomes: Vec<Result<HttpResponse, TransportError>>) -> Self {
        outcomes.reverse();
        Self {
            outcomes: Mutex::new(outcomes),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Transport for Scripted {
    fn send(&self, _: &HttpRequest, _: Duration) -> Result<HttpResponse, TransportError> {
        *self.calls.lock().unwrap() += 1;
        self.outcomes.lock().unwrap().pop().expect("script exhausted")
    }
}

fn throttled(retry_after: Option<&str>) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: 429,
        headers: retry_after
            .map(|v| vec![("Retry-After".to_string(), v.to_string())])
            .unwrap_or_default(),
        body: r#"{"reason":"requestThrottled"}"#.to_string(),
    })
}

fn ok() -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: 200,
        headers: Vec::new(),
        body: r#"{"items":[]}"#.to_string(),
    })
}

/// Client whose sleeps are recorded rather than performed.
fn client(
    max_retries: u32,
    backoff: Duration,
    script: Vec<Result<HttpResponse, TransportError>>,
) -> (CocClient<Scripted>, Arc<Mutex<Vec<Duration>>>) {
    let slept = Arc::new(Mutex::new(Vec::<Duration>::new()));
    let record = Arc::clone(&slept);
    let sleeper: Sleeper = Arc::new(move |d: Duration| record.lock().unwrap().push(d));
    let config = ClientConfig::default()
        .with_base_url("http://localhost:3000/v1")
        .with_max_retries(max_retries)
        .with_backoff_base(backoff);
    let client = CocClient::with_transport(config, "t", Scripted::new(script))
        .unwrap()
        .with_sleeper(sleeper);
    (client, slept)
}

#[test]
fn retry_after_header_overrides_exponential_backoff() {
    let (c, slept) = client(
        1,
        Duration::from_millis(750),
        vec![throttled(Some("3")), ok()],
    );
    c.list_locations(Paging::none()).unwrap();
    assert_eq!(*slept.lock().unwrap(), vec![Duration::from_secs(3)]);
}

#[test]
fn zero_retry_after_still_waits_backoff() {
    let (c, slept) = client(
        1,
        Duration::from_millis(750),
        vec![throttled(Some("0")), ok()],
    );
    c.list_locations(Paging::none()).unwrap();
    assert_eq!(*slept.lock().unwrap(), vec![Duration::from_millis(750)]);
}

#[test]
fn missing_retry_after_falls_back_to_backoff() {
    let (c, slept) = client(
        3,
        Duration::from_millis(100),
        vec![throttled(None), throttled(Some("later")), ok()],
    );
    c.list_locations(Paging::none()).unwrap();
    assert_eq!(
        *slept.lock().unwrap(),
        vec![Duration::from_millis(100), Duration::from_millis(200)]
    );
}

#[test]
fn transport_failures_back_off_exponentially() {
    let (c, slept) = client(
        3,
        Duration::from_millis(100),
        vec![
            Err(TransportError::Timeout("t".into())),
            Err(TransportError::Connection("c".into())),
            Err(TransportError::Timeout("t".into())),
            Err(TransportError::Connection("c".into())),
        ],
    );
    let err = c.list_locations(Paging::none()).unwrap_err();
    assert!(matches!(
        err,
        ApiError::Network {
            attempts: 4,
            source: TransportError::Connection(_)
        }
    ));
    assert_eq!(
        *slept.lock().unwrap(),
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(400)
        ]
    );
}

#[test]
fn one_retry_means_exactly_two_attempts() {
    let (c, slept) = client(1, Duration::ZERO, vec![throttled(Some("0")), throttled(Some("0"))]);
    let err = c.list_locations(Paging::none()).unwrap_err();
    assert!(matches!(err, ApiError::RateLimitExceeded { attempts: 2 }));
    assert_eq!(c.transport().calls(), 2);
    // No sleep after the final attempt.
    assert_eq!(slept.lock().unwrap().len(), 1);
}

#[test]
fn throttled_then_ok_returns_payload_after_two_attempts() {
    let (c, _) = client(1, Duration::ZERO, vec![throttled(Some("0")), ok()]);
    let value = c.list_locations(Paging::limit(5)).unwrap();
    assert!(value["items"].is_array());
    assert_eq!(c.transport().calls(), 2);
}

#[test]
fn terminal_errors_never_sleep() {
    let (c, slept) = client(
        3,
        Duration::from_secs(1),
        vec![Ok(HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: r#"{"reason":"notFound"}"#.to_string(),
        })],
    );
    let err = c.get_player("#NOPE").unwrap_err();
    assert!(matches!(err, ApiError::NotFound { ref body } if body.contains("notFound")));
    assert!(slept.lock().unwrap().is_empty());
}

#[test]
#[tracing_test::traced_test]
fn retries_are_logged() {
    let (c, _) = client(2, Duration::ZERO, vec![throttled(Some("0")), ok()]);
    c.list_locations(Paging::none()).unwrap();
    assert!(logs_contain("rate limited, retrying"));
    assert!(logs_contain("coc_request"));
}
