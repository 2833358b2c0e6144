fn main() {
    automaker_stocks::cli::run();
}
