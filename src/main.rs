use log::error;

fn main() {
    let cli_args = match pagekit::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}\n", e);
            pagekit::show_help();
            std::process::exit(2);
        }
    };
    if cli_args.show_help {
        pagekit::show_help();
        return;
    }

    pagekit::init_logger(&cli_args.log_level);
    pagekit::registry::initialize_cell_plugins();

    #[cfg(all(feature = "native", not(target_arch = "wasm32")))]
    if let Err(e) = pagekit::run(&cli_args) {
        error!("{}", e);
        std::process::exit(1);
    }

    #[cfg(not(all(feature = "native", not(target_arch = "wasm32"))))]
    {
        // WASM環境では wasm_entry から描画する
        error!("The pagekit CLI needs the `native` feature");
        std::process::exit(1);
    }
}
