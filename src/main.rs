fn main() {
    splice::cli::run();
}
