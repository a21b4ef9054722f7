use byte_unit::Byte;
use clap::Parser;

#[derive(Parser, Debug, PartialEq)]
#[command(author, version, about, long_about)]
pub enum FlatFsCli {
    /// create a new container
    Format(FormatArgs),
    /// open a container and run commands read from stdin
    Shell(ShellArgs),
}
///make a new container subcommand
#[derive(clap::Args, Debug, PartialEq)]
#[command(author, version, about = "make a new container")]
pub struct FormatArgs {
    /// the path of the container image file
    #[clap(short = 'p', long)]
    pub image_file_path: String,
    /// the size of the container, `131072` or `128KiB`
    #[clap(short, long, value_parser = parse_size)]
    pub size: u64,
}

/// interactive shell subcommand
#[derive(clap::Args, Debug, PartialEq)]
#[command(author, version, about = "run commands against a container")]
pub struct ShellArgs {
    /// the path of the container image file
    #[clap(short = 'p', long)]
    pub image_file_path: String,
    /// format the container with this size before opening it
    #[clap(short, long, value_parser = parse_size)]
    pub format: Option<u64>,
    /// the most names `ls` prints for one directory
    #[clap(short = 'n', long, default_value_t = 50)]
    pub max_entries: usize,
}

/// parse a size with an optional unit suffix
fn parse_size(size: &str) -> Result<u64, String> {
    let bytes = Byte::from_str(size).map_err(|e| e.to_string())?;
    u64::try_from(bytes.get_bytes()).map_err(|e| e.to_string())
}
