//! Composition root: everything a command or the server needs, built once.

use casewise_core::graph::GraphReader;
use casewise_core::llm::{Provider, LLM};
use casewise_core::report::ReportSettings;
use casewise_core::{CaseStore, Config, ReportDrafter};
use tracing::info;

pub struct App {
    pub config: Config,
    pub cases: CaseStore,
    pub graph: GraphReader,
    pub drafter: ReportDrafter<Box<dyn LLM>>,
}

impl App {
    /// Load the case library, connect to the graph and set up the LLM client.
    ///
    /// Neither a missing case file nor an unreachable graph is an error here;
    /// both degrade to placeholder or unavailable results.
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let cases = CaseStore::load(config.content.cases_path());
        let graph = GraphReader::connect(&config.graph).await;

        let llm = Provider::from_config(&config.llm)?.build();
        let drafter = ReportDrafter::new(llm, ReportSettings::from_config(&config));

        info!(
            cases = cases.len(),
            graph = graph.is_available(),
            model = drafter.llm().model(),
            "casewise ready"
        );

        Ok(Self {
            config,
            cases,
            graph,
            drafter,
        })
    }
}
