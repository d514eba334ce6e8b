//! Benchmark parameter types, rendered as Criterion benchmark ids.

use std::fmt;

use grafy_core::TopologyKind;

/// Parameters for a graph generation benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct GenerateBenchParams {
    /// Topology preset.
    pub topology: TopologyKind,
    /// Vertex count of the generated graph.
    pub order: usize,
}

impl fmt::Display for GenerateBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},n={}", self.topology, self.order)
    }
}

/// Parameters for a run-log benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct LogBenchParams {
    /// Lines in the synthetic log.
    pub line_count: usize,
}

impl fmt::Display for LogBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lines={}", self.line_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_name_the_varied_parameters() {
        let generate = GenerateBenchParams {
            topology: TopologyKind::Grid,
            order: 100,
        };
        assert_eq!(generate.to_string(), "grid,n=100");
        assert_eq!(LogBenchParams { line_count: 10 }.to_string(), "lines=10");
    }
}
