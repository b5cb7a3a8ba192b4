use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nds-mcp")]
#[command(about = "Nuclear data lookups: separation energies and Q-values")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP server over stdio
    Serve,

    /// Show where the databases are and whether they are installed
    Info,

    /// Look up separation energies for a nuclide
    Separation {
        /// Proton number
        #[arg(long)]
        z: u32,
        /// Mass number
        #[arg(long)]
        a: u32,
        /// Only this quantity (Sn, Sp, S2n, S2p)
        #[arg(long = "type")]
        kind: Option<String>,
    },

    /// Look up reaction Q-values for a nuclide
    QValue {
        /// Proton number
        #[arg(long)]
        z: u32,
        /// Mass number
        #[arg(long)]
        a: u32,
        /// Only this quantity (Qa, Q2bm, Qep, Qbn, Q4bm, Qda, Qpa, Qna)
        #[arg(long = "type")]
        kind: Option<String>,
    },
}
