fn main() -> std::process::ExitCode {
    shotlist_renamer_lib::run()
}
