// src/cli/args.rs

use clap::Parser;

/// Generates Go wrapper types that forward a base interface, plus every
/// subset of optional extension interfaces, to user-supplied functions.
#[derive(Parser, Debug, Default)]
#[command(name = "wrapgen")]
#[command(version = "0.1.0")]
#[command(about = "Go interface wrapper generator", long_about = None)]
pub struct Cli {
    /// Input file; if empty, the GOFILE environment variable is consulted
    #[arg(long = "infile", env = "GOFILE", default_value = "", hide_env_values = true)]
    pub in_file: String,

    /// Output file; if empty, it is deduced from the base type
    #[arg(long = "outfile", default_value = "")]
    pub out_file: String,

    /// Base type, like driver.Conn
    #[arg(long = "basetype", default_value = "")]
    pub base_type: String,

    /// Semicolon-separated list of extension types, like
    /// driver.ConnBeginTx;driver.ConnPrepareContext
    #[arg(long = "exttypes", default_value = "")]
    pub ext_types: String,

    /// Semicolon-separated list of comma-separated name-type pairs of
    /// extra fields, like count,int;logger,slog.Logger
    #[arg(long = "extrafields", default_value = "")]
    pub extra_fields: String,

    /// Semicolon-separated list of imports; each either a path (like
    /// database/sql/driver) or name,path (like driver,database/sql/driver)
    #[arg(long = "imports", default_value = "")]
    pub imports: String,

    /// Prefix of the function called by the generated methods, like real
    /// (makes a Close method call the realClose function)
    #[arg(long = "prefix", default_value = "")]
    pub prefix: String,

    /// Name of the function creating a wrapper, like newConn
    #[arg(long = "newfuncname", default_value = "")]
    pub new_func_name: String,
}
