fn main() {
    pdf_markup_cli::init_logging();

    if let Err(error) = pdf_markup_cli::run(std::env::args_os()) {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}
