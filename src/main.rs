fn main() {
    if let Err(err) = nxmeta::run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
