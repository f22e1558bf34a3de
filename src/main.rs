fn main() {
    if let Err(e) = stiff_rs::adapters::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
