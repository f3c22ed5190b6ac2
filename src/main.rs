use clap::Parser;
use hammer_dance::{hammer_dance_loop, ContextParametersExt, ModelError};
use ixa::{
    info, report::ContextReportExt, set_log_level, Context, ContextGlobalPropertiesExt, IxaError,
    LevelFilter,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// path to the input file
    #[arg(short, long)]
    input_file: PathBuf,

    /// path to the output directory
    #[arg(short, long)]
    output_directory: PathBuf,

    /// log level: off, error, warn, info, debug or trace
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn initialize(args: &Args) -> Result<Context, IxaError> {
    let mut context = Context::new();
    // read the global properties; the parameters are validated on load
    context.load_global_properties(&args.input_file)?;

    std::fs::create_dir_all(&args.output_directory).map_err(ModelError::from)?;
    context
        .report_options()
        .overwrite(true)
        .directory(args.output_directory.clone());

    hammer_dance_loop::init(
        &mut context,
        hammer_dance_loop::summarize_and_export(args.output_directory.clone()),
    )?;

    // make it easy for the user to see what the parameters are
    info!("{:?}", context.get_params());
    Ok(context)
}

fn main() {
    let args = Args::parse();
    set_log_level(args.log_level);
    let mut context = initialize(&args).expect("Error initializing.");
    context.execute();
}
