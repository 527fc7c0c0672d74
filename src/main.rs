mod cli;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let code = match cli::run() {
        cli::RunOutcome::Start(config, action) => modesync::run(config, action).await,
        cli::RunOutcome::Exit(code) => code,
    };
    std::process::exit(code);
}
