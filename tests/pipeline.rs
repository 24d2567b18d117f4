//! End-to-end tests against real loopback listeners.

use skulk::banner::{BannerGrabber, GrabPolicy};
use skulk::cli::{scan, ScanOptions};
use skulk::output::ResultSink;
use skulk::scanner::{run_scan, Admission, NoJitter, Pacer, RateController, TcpConnector};
use skulk::types::{Port, PortRange, PortSelection, ScanTask};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

fn quick_policy() -> GrabPolicy {
    GrabPolicy::default().with_read_deadline(Duration::from_millis(300))
}

fn quick_grabber() -> (BannerGrabber<TcpConnector>, Arc<RateController>) {
    let rate = Arc::new(RateController::new());
    let pacer = Pacer::new(Arc::clone(&rate), Arc::new(NoJitter));
    let grabber = BannerGrabber::new(TcpConnector::new(Duration::from_secs(1)), pacer)
        .with_policy(quick_policy());
    (grabber, rate)
}

/// Accept forever, running `serve` on each connection. Returns the port
/// and a connection counter.
async fn listen<F, Fut>(serve: F) -> (u16, Arc<AtomicUsize>)
where
    F: Fn(TcpStream) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(serve(stream));
        }
    });

    (port, accepted)
}

/// Read until the client hangs up.
async fn hold(mut stream: TcpStream) {
    let mut buf = [0u8; 256];
    while let Ok(n) = stream.read(&mut buf).await {
        if n == 0 {
            break;
        }
    }
}

async fn hello(mut stream: TcpStream) {
    let _ = stream.write_all(b"hello\n").await;
    hold(stream).await;
}

/// A port with nothing listening on it.
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

#[tokio::test]
async fn silent_listener_yields_nothing_after_all_retries() {
    let (port, accepted) = listen(hold).await;
    let (grabber, rate) = quick_grabber();

    assert_eq!(grabber.grab("127.0.0.1", port).await, None);
    assert_eq!(accepted.load(Ordering::SeqCst), 3);
    assert_eq!(rate.factor(), 1.1 * 1.1 * 1.1);
}

#[tokio::test]
async fn talkative_listener_answers_on_first_attempt() {
    let (port, accepted) = listen(|mut stream: TcpStream| async move {
        let _ = stream.write_all(b"  Welcome to FooServ 1.0 \r\n").await;
        hold(stream).await;
    })
    .await;
    let (grabber, rate) = quick_grabber();

    let banner = grabber.grab("127.0.0.1", port).await;
    assert_eq!(banner.as_deref(), Some(&b"Welcome to FooServ 1.0"[..]));
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
    assert!(rate.factor() < 1.0);
}

#[tokio::test]
async fn closed_port_yields_nothing() {
    let port = closed_port().await;
    let (grabber, rate) = quick_grabber();

    assert_eq!(grabber.grab("127.0.0.1", port).await, None);
    assert!(rate.factor() > 1.0);
}

#[tokio::test]
async fn only_the_listening_port_is_reported() {
    let (open, _) = listen(hello).await;
    let closed_a = closed_port().await;
    let closed_b = closed_port().await;
    let (grabber, _) = quick_grabber();

    let tasks: Vec<ScanTask> = [closed_a, open, closed_b]
        .into_iter()
        .map(|p| ScanTask::new("127.0.0.1", Port::new(p).unwrap()))
        .collect();

    let (tx, rx) = mpsc::unbounded_channel();
    let sink = ResultSink::new(rx, Vec::new()).spawn();
    let stats = run_scan(Arc::new(grabber), tasks, &Admission::new(2), tx, None).await;
    let (out, lines) = sink.await.unwrap().unwrap();

    assert_eq!(stats.tasks, 3);
    assert_eq!(stats.found, 1);
    assert_eq!(lines, 1);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!("127.0.0.1:{} - hello\n", open)
    );
}

#[tokio::test]
async fn full_pipeline_prints_one_line() {
    let (port, _) = listen(hello).await;
    let range: PortRange = format!("{}-{}", port, port).parse().unwrap();
    let options = ScanOptions {
        ports: PortSelection::Range(range),
        timeout: Duration::from_secs(1),
        policy: quick_policy(),
        ..ScanOptions::default()
    };

    let report = scan(
        &options,
        vec!["127.0.0.1".to_string()],
        Vec::new(),
        Arc::new(NoJitter),
    )
    .await
    .unwrap();

    assert_eq!(report.lines, 1);
    assert_eq!(
        String::from_utf8(report.out).unwrap(),
        format!("127.0.0.1:{} - hello\n", port)
    );
}

#[tokio::test]
async fn top_ports_scan_reports_well_known_listener() {
    // 9999 is on the well-known list; skip when something else holds it.
    let Ok(listener) = TcpListener::bind("127.0.0.1:9999").await else {
        return;
    };
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(hello(stream));
        }
    });

    let options = ScanOptions {
        ports: PortSelection::Top,
        timeout: Duration::from_millis(300),
        policy: quick_policy(),
        ..ScanOptions::default()
    };
    let report = scan(
        &options,
        vec!["127.0.0.1".to_string()],
        Vec::new(),
        Arc::new(NoJitter),
    )
    .await
    .unwrap();

    assert_eq!(report.stats.tasks, PortSelection::Top.ports().len());
    assert_eq!(report.lines, 1);
    assert_eq!(
        String::from_utf8(report.out).unwrap(),
        "127.0.0.1:9999 - hello\n"
    );
}

#[tokio::test]
async fn connection_rate_cap_is_respected() {
    let port = closed_port().await;
    let rate = Arc::new(RateController::new());
    let pacer = Pacer::new(rate, Arc::new(NoJitter));
    let grabber = BannerGrabber::new(TcpConnector::new(Duration::from_secs(1)), pacer)
        .with_policy(quick_policy())
        .with_rate_limiter(skulk::scanner::RateLimiter::per_second(2));

    // Three attempts at 2/s: the burst covers two, the third waits ~500ms.
    let start = std::time::Instant::now();
    assert_eq!(grabber.grab("127.0.0.1", port).await, None);
    assert!(start.elapsed() >= Duration::from_millis(400));
}
