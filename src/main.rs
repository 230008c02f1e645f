fn main() {
    if let Err(err) = steptrack_lib::run() {
        eprintln!("steptrack: {err:#}");
        std::process::exit(1);
    }
}
