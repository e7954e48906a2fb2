fn main() {
    if let Err(error) = sqlrw_cli::run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
