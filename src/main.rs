fn main() {
    vireo::cli::run();
}
