
use edgebench::{
    coloring::ParseMode,
    configs::bench::GraphConfig,
    graph::generator::GraphGenerator,
    orchestrator::{BenchmarkOrchestrator, BenchmarkResult, RunListener, SkippedConfig},
    report::TextReport,
};
use helper::{ScriptedService, Step, Workspace};

fn configs(sizes: &[(usize, usize)]) -> Vec<GraphConfig> {
    sizes.iter().copied().map(GraphConfig::from).collect()
}

fn orchestrator(
    service: ScriptedService,
    mode: ParseMode,
) -> anyhow::Result<BenchmarkOrchestrator<ScriptedService, rand::rngs::SmallRng>> {
    let generator = GraphGenerator::seeded(11, 0.3)?;
    Ok(BenchmarkOrchestrator::new(service, generator, mode))
}

#[derive(Default)]
struct Events(Vec<String>);

impl RunListener for Events {
    fn on_config_start(&mut self, config: GraphConfig) -> anyhow::Result<()> {
        self.0.push(format!("start {}", config));
        Ok(())
    }

    fn on_result(&mut self, result: &BenchmarkResult) -> anyhow::Result<()> {
        self.0.push(format!("result {}", result.config));
        Ok(())
    }

    fn on_skipped(&mut self, skipped: &SkippedConfig) -> anyhow::Result<()> {
        self.0.push(format!("skipped {}", skipped.config));
        Ok(())
    }
}

#[test]
fn valid_external_colorings() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let service = ScriptedService::new(ws.path(), []);
    let mut orchestrator = orchestrator(service, ParseMode::Lenient)?;
    let sizes = configs(&[(5, 10), (10, 20), (30, 30)]);
    let run = orchestrator.run(&sizes, &mut ())?;
    assert!(run.skipped.is_empty());
    assert_eq!(run.results.len(), 3);
    for (result, config) in run.results.iter().zip(&sizes) {
        assert_eq!(result.config, *config);
        assert!(result.validity.valid, "{}", result.validity.message);
        assert!(result.nodes <= config.n + config.m);
        assert!(result.reference.colors_used >= result.theoretical_minimum);
        assert_eq!(result.external.colors_used, result.reference.colors_used);
        assert!(result.speedup > 0.0);
    }
    assert_eq!(orchestrator.service().builds, 1);
    assert_eq!(orchestrator.service().runs, 3);
    Ok(())
}

#[test]
fn failed_run_skips_only_that_config() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let service = ScriptedService::new(ws.path(), [Step::Color, Step::Fail, Step::Color]);
    let mut orchestrator = orchestrator(service, ParseMode::Lenient)?;
    let mut events = Events::default();
    let run = orchestrator.run(&configs(&[(3, 3), (4, 4), (5, 5)]), &mut events)?;
    let done = run.results.iter().map(|r| r.config).collect::<Vec<_>>();
    assert_eq!(done, configs(&[(3, 3), (5, 5)]));
    assert_eq!(run.skipped.len(), 1);
    assert_eq!(run.skipped[0].config, GraphConfig::new(4, 4));
    assert!(run.skipped[0].reason.contains("code 1"));
    assert_eq!(
        events.0,
        [
            "start 3x3",
            "result 3x3",
            "start 4x4",
            "skipped 4x4",
            "start 5x5",
            "result 5x5"
        ]
    );
    Ok(())
}

#[test]
fn build_failure_aborts_before_any_config() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let mut service = ScriptedService::new(ws.path(), []);
    service.fail_build = true;
    let mut orchestrator = orchestrator(service, ParseMode::Lenient)?;
    let mut events = Events::default();
    let err = orchestrator
        .run(&configs(&[(5, 10), (10, 100)]), &mut events)
        .unwrap_err();
    assert!(err.to_string().contains("expected ';'"));
    assert_eq!(orchestrator.service().runs, 0);
    assert!(events.0.is_empty());
    assert!(!ws.path().join("test.txt").exists());
    Ok(())
}

#[test]
fn invalid_coloring_is_reported_not_skipped() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let service = ScriptedService::new(ws.path(), [Step::SameColor]);
    let mut orchestrator = orchestrator(service, ParseMode::Lenient)?;
    // p = 0.3 on 10x10 leaves a node of degree >= 2 for this seed
    let run = orchestrator.run(&configs(&[(10, 10)]), &mut ())?;
    assert_eq!(run.results.len(), 1);
    let result = &run.results[0];
    assert!(result.theoretical_minimum >= 2);
    assert!(!result.validity.valid);
    assert!(result.validity.message.contains("two edges with same color 0"));
    assert_eq!(result.external.colors_used, 1);
    Ok(())
}

#[test]
fn output_without_entries_is_an_empty_coloring() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let service = ScriptedService::new(ws.path(), [Step::Garbage]);
    let mut orchestrator = orchestrator(service, ParseMode::Lenient)?;
    let run = orchestrator.run(&configs(&[(10, 10)]), &mut ())?;
    let result = &run.results[0];
    assert!(result.edges > 0);
    assert!(result.is_empty_coloring());
    assert!(!result.validity.valid);
    assert!(result.validity.message.contains("not found"));
    Ok(())
}

#[test]
fn duplicate_entries_depend_on_parse_mode() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let service = ScriptedService::new(ws.path(), [Step::Duplicates]);
    let mut lenient = orchestrator(service, ParseMode::Lenient)?;
    let run = lenient.run(&configs(&[(6, 6)]), &mut ())?;
    assert!(run.results[0].validity.valid);

    let service = ScriptedService::new(ws.path(), [Step::Duplicates]);
    let mut strict = orchestrator(service, ParseMode::Strict)?;
    let run = strict.run(&configs(&[(6, 6)]), &mut ())?;
    assert!(run.results.is_empty());
    assert!(run.skipped[0].reason.contains("unusable external output"));
    Ok(())
}

#[test]
fn empty_graph_config() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let service = ScriptedService::new(ws.path(), []);
    let mut orchestrator = orchestrator(service, ParseMode::Lenient)?;
    let run = orchestrator.run(&configs(&[(0, 0)]), &mut ())?;
    let result = &run.results[0];
    assert_eq!((result.nodes, result.edges), (0, 0));
    assert_eq!(result.theoretical_minimum, 0);
    assert_eq!(result.reference.colors_used, 0);
    assert!(result.validity.valid);
    assert!(!result.is_empty_coloring());
    Ok(())
}

#[test]
fn text_report_records_sections_and_summary() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let service = ScriptedService::new(ws.path(), [Step::Color, Step::Fail]);
    let mut orchestrator = orchestrator(service, ParseMode::Lenient)?;
    let mut report = TextReport::create(ws.path().join("benchmark_report.txt"))?;
    orchestrator.run(&configs(&[(5, 10), (10, 100)]), &mut report)?;
    let text = ws.read("benchmark_report.txt")?;
    assert!(text.starts_with("BENCHMARK REPORT"));
    assert!(text.contains("BENCHMARK: External vs Reference (5x10 bipartite graph)"));
    assert!(text.contains("Validity External: Valid coloring"));
    assert!(text.contains("FAILED: external program exited with code 1"));
    assert!(text.contains("SUMMARY"));
    assert!(text.contains("Skipped 10x100"));
    Ok(())
}

#[test]
fn text_report_notes_aborted_run() -> anyhow::Result<()> {
    let ws = Workspace::new()?;
    let mut service = ScriptedService::new(ws.path(), []);
    service.fail_build = true;
    let mut orchestrator = orchestrator(service, ParseMode::Lenient)?;
    let mut report = TextReport::create(ws.path().join("benchmark_report.txt"))?;
    let err = orchestrator
        .run(&configs(&[(5, 10)]), &mut report)
        .unwrap_err();
    report.aborted(&err)?;
    let text = ws.read("benchmark_report.txt")?;
    assert!(text.contains("FAILED: Compilation failed"));
    assert!(!text.contains("SUMMARY"));
    Ok(())
}
