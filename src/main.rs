fn main() -> std::process::ExitCode {
    jarjar_lib::run()
}
