use ping_probe::{
    interrupt_channel, spawn_reporter, InterruptSender, PingProbeConfig, PingRunner, ProbeOutcome, ProbeSession, Snapshot,
    Ttl,
};
use std::time::Duration;

type GenericError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(argh::FromArgs)]
/// ping-probe - send ICMP ECHO_REQUEST to a host and report loss and round-trip times
struct Args {
    #[argh(option, short = 's', default = "ping_probe::DEFAULT_PAYLOAD_SIZE")]
    /// size (in bytes) of the echo payload
    size: usize,

    #[argh(option, short = 't', default = "64")]
    /// time to live, number of L3 hops before the packet dies
    ttl: u8,

    #[argh(option, short = 'c')]
    /// stop after <count> sent probes
    count: Option<u64>,

    #[argh(option, short = 'i', default = "1.0")]
    /// seconds to wait between two probes
    interval: f64,

    #[argh(option, default = "5.0")]
    /// seconds to wait for a reply
    timeout: f64,

    #[argh(switch, short = 'v')]
    /// verbose logging
    verbose: bool,

    #[argh(positional)]
    /// host name or IP address
    host: String,
}

fn main() {
    let args: Args = argh::from_env();

    let level = if args.verbose { tracing::Level::TRACE } else { tracing::Level::WARN };
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(e) = run(args) {
        eprintln!("ping-probe: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), GenericError> {
    let config = PingProbeConfig {
        payload_size: args.size,
        ttl: Ttl(args.ttl),
        timeout: Duration::try_from_secs_f64(args.timeout)?,
        interval: Duration::try_from_secs_f64(args.interval)?,
    };
    let session = ProbeSession::new(&args.host, config)?;
    println!("PING {} ({}): {} data bytes", args.host, session.target(), args.size);

    let (interrupt_tx, interrupt_rx) = interrupt_channel();
    let host = args.host.clone();
    let reporter = spawn_reporter(interrupt_rx, session.statistics(), move |snapshot| {
        print_report(&host, &snapshot);
        std::process::exit(0);
    });
    spawn_interrupt_listener(interrupt_tx.clone())?;

    let runner = PingRunner::start(session, args.count);
    while let Some(result) = runner.next_outcome() {
        match result {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => eprintln!("{e}"),
        }
    }

    // Only reached with --count: report the same way as on an interrupt.
    interrupt_tx.send(())?;
    if reporter.join().is_err() {
        return Err("reporter thread panicked".into());
    }
    Ok(())
}

fn spawn_interrupt_listener(interrupt_tx: InterruptSender) -> std::io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    std::thread::spawn(move || {
        runtime.block_on(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    let _ = interrupt_tx.send(());
                }
                Err(e) => tracing::error!("could not listen for ctrl-c: {}", e),
            }
        });
    });
    Ok(())
}

fn print_outcome(outcome: &ProbeOutcome) {
    match outcome {
        ProbeOutcome::Reply(data) => println!(
            "{} bytes received ({:.1}% loss) from {}: icmp_seq={} time={:.1} ms",
            data.bytes_received,
            data.loss_percent,
            data.source,
            data.sequence_number,
            data.rtt_ms()
        ),
        ProbeOutcome::NonEcho(data) => println!(
            "from {}: icmp_seq={} icmp_type={} icmp_code={} ({}) time={:.1} ms",
            data.source,
            data.sequence_number,
            data.icmp_type,
            data.icmp_code,
            describe_icmp_type(data.source.is_ipv4(), data.icmp_type),
            data.rtt_ms()
        ),
        ProbeOutcome::Timeout { sequence_number } => println!("request timeout for icmp_seq={sequence_number}"),
    }
}

fn describe_icmp_type(is_ipv4: bool, icmp_type: u8) -> &'static str {
    match (is_ipv4, icmp_type) {
        (true, 3) | (false, 1) => "destination unreachable",
        (true, 11) | (false, 3) => "time exceeded",
        (false, 2) => "packet too big",
        (true, 12) | (false, 4) => "parameter problem",
        _ => "unexpected message",
    }
}

fn print_report(host: &str, snapshot: &Snapshot) {
    println!("\n--- {host} ping statistics ---");
    println!(
        "{} packets sent, {} packets received, {:.1}% loss",
        snapshot.sent, snapshot.received, snapshot.loss_percent
    );
    if let Some(rtt) = snapshot.rtt {
        println!("rtt min/avg/max = {:.3}/{:.3}/{:.3} ms", rtt.min_ms, rtt.avg_ms, rtt.max_ms);
    }
}
