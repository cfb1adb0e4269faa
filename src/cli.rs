use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::render::Projection;

#[derive(Parser, Debug)]
#[command(author, version, about = "Charts and animations from swarm simulation output", long_about = None)]
pub struct Args {
    /// JSON config; built-in defaults are used when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the directory inputs are read from and outputs written to
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Skip titles, axis labels and legends
    #[arg(long, global = true, default_value_t = false)]
    pub plain: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Animate entity positions, one GIF per projection
    Mobility {
        /// Render only this projection
        #[arg(long, value_enum)]
        projection: Option<Projection>,
    },
    /// Plot distance between entity pairs
    Distance {
        /// Render only the plot with this prefix
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Plot per-node velocity
    Velocity,
    /// Plot the received-bytes counter of one run
    TotalRx(RunParams),
    /// Print the sweep table sorted by one column and its correlation matrix
    Corr {
        /// Column to sort by (defaults to the configured one)
        #[arg(long)]
        sort_by: Option<String>,

        /// Emit JSON instead of text tables
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the effective configuration as JSON
    Config,
}

/// Simulation parameters of the run being plotted; they name the output file
/// and fill the chart title.
#[derive(clap::Args, Debug, Clone)]
pub struct RunParams {
    /// Separation weight
    pub ws: String,
    /// Alignment weight
    pub wa: String,
    /// Cohesion weight
    pub wc: String,
    /// Relay distance
    pub dist: String,
    /// Enemy flag
    pub enemy: String,
}

impl RunParams {
    /// `total_rx-<ws>-<wa>-<wc>-<dist>-<enemy>`
    pub fn prefix(&self, base: &str) -> String {
        format!(
            "{base}-{}-{}-{}-{}-{}",
            self.ws, self.wa, self.wc, self.dist, self.enemy
        )
    }

    pub fn title(&self) -> String {
        format!(
            "Total Rx (W_S: {}, W_A: {}, W_C: {}, Dist: {})",
            self.ws, self.wa, self.wc, self.dist
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_rx_needs_five_positionals() {
        assert!(Args::try_parse_from(["swarm-plot", "total-rx", "0.1", "0.3", "0.5", "35"]).is_err());
        let args =
            Args::try_parse_from(["swarm-plot", "total-rx", "0.1", "0.3", "0.5", "35", "1"]).unwrap();
        let Command::TotalRx(p) = args.command else {
            panic!("expected total-rx");
        };
        assert_eq!(p.prefix("total_rx"), "total_rx-0.1-0.3-0.5-35-1");
        assert_eq!(p.title(), "Total Rx (W_S: 0.1, W_A: 0.3, W_C: 0.5, Dist: 35)");
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let args = Args::try_parse_from([
            "swarm-plot",
            "mobility",
            "--projection",
            "xz",
            "--output-dir",
            "out",
            "--plain",
        ])
        .unwrap();
        assert!(args.plain);
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert!(matches!(
            args.command,
            Command::Mobility {
                projection: Some(Projection::Xz)
            }
        ));
    }

    #[test]
    fn projection_values_match_file_suffixes() {
        use clap::ValueEnum;
        for p in Projection::ALL {
            assert_eq!(Projection::from_str(p.suffix(), false), Ok(p));
        }
    }
}
