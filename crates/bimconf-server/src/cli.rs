use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub filters: FilterArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Synthesize the configuration document of an element export
    Synth(SynthArgs),
    /// Print `label<TAB>category` for every device, sorted, for sticker printing
    Labels(InputArgs),
    /// Print the device inventory (project joined with model catalog) as JSON
    Inventory(InputArgs),
    /// Serve the synthesis over HTTP
    Serve(ServeArgs),
}

/// Label blocklist and element class overrides
#[derive(ClapArgs, Debug, Default)]
pub struct FilterArgs {
    /// Label substring marking furniture (repeatable)
    #[arg(long = "furniture-marker", global = true)]
    pub furniture_markers: Vec<String>,

    /// Label substring marking a secondary output channel (repeatable)
    #[arg(long = "exclude-token", global = true)]
    pub excluded_tokens: Vec<String>,

    /// Accepted element class, e.g. IfcBuildingElementProxy (repeatable)
    #[arg(long = "element-class", global = true)]
    pub element_classes: Vec<String>,
}

#[derive(ClapArgs, Debug)]
pub struct InputArgs {
    /// Path to the element export (.json)
    pub input: String,
}

#[derive(ClapArgs, Debug)]
pub struct SynthArgs {
    /// Path to the element export (.json)
    pub input: String,

    /// Write the document here instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Emit compact JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ServeArgs {
    /// Port to serve on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,
}
