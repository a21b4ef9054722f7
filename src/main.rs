use clap::Parser;
use flatfs::cli_interface::{FlatFsCli, Shell};
use std::io;
/// a CLI interface to users to create a container,
/// or open one and run filesystem commands against it.
///
/// The shell reads commands from stdin until `quit` or the end of input.
fn main() -> anyhow::Result<()> {
    env_logger::builder().format_timestamp_nanos().init();
    let args = FlatFsCli::parse();
    match args {
        FlatFsCli::Format(args) => {
            //create a new container
            let fs = flatfs::format::format(&args.image_file_path, args.size)?;
            println!(
                "created {} with {} blocks",
                args.image_file_path,
                fs.superblock().block_count
            );
        }
        FlatFsCli::Shell(args) => {
            //format first if asked to, otherwise open what is there
            let fs = match args.format {
                Some(size) => flatfs::format::format(&args.image_file_path, size)?,
                None => flatfs::format::open(&args.image_file_path)?,
            };
            let mut shell = Shell::new(fs, args.max_entries);
            shell.run(io::stdin().lock(), &mut io::stdout().lock())?;
        }
    }
    Ok(())
}
