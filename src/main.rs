use sms_safe::{InterceptConfig, Interceptor, PlainAdapter, PlainSms};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [from, to, text] = args.as_slice() else {
        eprintln!("Usage: sms-safe <from> <to> <text>");
        eprintln!("  Configure with SMS_SAFE_INTERNAL_NUMBERS, SMS_SAFE_INTERCEPT_MECHANISM,");
        eprintln!("  SMS_SAFE_REDIRECT_TARGET, SMS_SAFE_EMAIL_TARGET, SMS_SAFE_DISCARD_DELAY_MS");
        std::process::exit(2);
    };

    let config = match std::env::var("SMS_SAFE_CONFIG") {
        Ok(path) => InterceptConfig::from_json_file(&path)?,
        Err(_) => InterceptConfig::from_env(),
    };
    let interceptor = Interceptor::new(config);

    match interceptor.process(&PlainAdapter, PlainSms::new(from, to, text))? {
        Some(sms) => println!("send: from={} to={} text={:?}", sms.from, sms.to, sms.text),
        None => println!("suppressed"),
    }

    Ok(())
}
