fn main() -> std::process::ExitCode {
    datadash_lib::run()
}
