fn main() {
    if let Err(err) = cube_fly::run() {
        eprintln!("Application error: {err}");
        std::process::exit(1);
    }
}
