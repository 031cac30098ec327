//! Report Formatting
//!
//! Renders cascade and contagion reports as pretty JSON, a one-line-per-step
//! event chain, or a human-readable narrative. `All` stitches the three
//! together under section banners.

use mimetic_events::{
    CascadeOutcome, CascadeReport, CascadeStep, ContagionPhase, ContagionReport,
    ContagionWarning, Decision, FinalSummary, GraphSnapshot,
};

/// Output styles for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    Human,
    Json,
    Chain,
    #[default]
    All,
}

impl ReportFormat {
    /// The single formats this one stands for, in output order
    pub fn expand(self) -> &'static [ReportFormat] {
        match self {
            ReportFormat::Human => &[ReportFormat::Human],
            ReportFormat::Json => &[ReportFormat::Json],
            ReportFormat::Chain => &[ReportFormat::Chain],
            ReportFormat::All => &[ReportFormat::Human, ReportFormat::Json, ReportFormat::Chain],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportFormat::Human => "human",
            ReportFormat::Json => "json",
            ReportFormat::Chain => "chain",
            ReportFormat::All => "all",
        }
    }

    /// File extension used when the report is written to disk
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            _ => "txt",
        }
    }
}

const RULE: &str = "======================================================================";

/// `{label.upper()} FORMAT` between two rules, as printed ahead of each section
fn banner(format: ReportFormat) -> String {
    format!("\n{}\n{} FORMAT\n{}\n", RULE, format.label().to_uppercase(), RULE)
}

fn sections(
    render: impl Fn(ReportFormat) -> Result<String, serde_json::Error>,
) -> Result<String, serde_json::Error> {
    let mut out = Vec::new();
    for format in ReportFormat::All.expand() {
        out.push(banner(*format));
        out.push(render(*format)?);
    }
    Ok(out.join("\n"))
}

pub fn format_cascade(report: &CascadeReport, format: ReportFormat) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Json => report.to_json_pretty(),
        ReportFormat::Chain => Ok(cascade_chain(report)),
        ReportFormat::Human => Ok(cascade_narrative(report)),
        ReportFormat::All => sections(|f| format_cascade(report, f)),
    }
}

pub fn format_contagion(
    report: &ContagionReport,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Json => report.to_json_pretty(),
        ReportFormat::Chain => Ok(contagion_chain(report)),
        ReportFormat::Human => Ok(contagion_narrative(report)),
        ReportFormat::All => sections(|f| format_contagion(report, f)),
    }
}

/// `<nodes>_<event>_<seedN|random>`, the stem shared by every report file of one run
pub fn report_base_name(nodes: &str, event: &str, seed: Option<u64>) -> String {
    let seed = seed.map_or_else(|| "random".to_string(), |s| format!("seed{}", s));
    format!("{}_{}_{}", nodes, event, seed)
}

/// `actor flips a↔b +→-` style line for any edge-changing decision
fn change_line(decision: &Decision) -> String {
    let from = decision
        .from_sign()
        .map_or_else(|| "0".to_string(), |s| s.to_string());
    let to = decision
        .to_sign()
        .map_or_else(|| "0".to_string(), |s| s.to_string());
    match decision.edge() {
        Some(edge) => format!("{} {}→{}", edge, from, to),
        None => String::new(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

// === CASCADE ===

/// One line per flip, perturbation first
pub fn cascade_chain(report: &CascadeReport) -> String {
    let mut lines = Vec::new();
    match &report.perturbation {
        Some(step) => lines.push(format!("PERTURB: {}", change_line(&step.decision))),
        None => lines.push("NO PERTURBATION - running from initial state".to_string()),
    }
    for step in &report.steps {
        lines.push(format!(
            "STEP {}: {} flips {}",
            step.step,
            step.decision.actor(),
            change_line(&step.decision)
        ));
    }
    if let CascadeOutcome::Stuck { nodes } = &report.outcome {
        lines.push(format!("STUCK: {} (no take-backs)", nodes.join(", ")));
    }
    lines.join("\n")
}

fn edge_counts(lines: &mut Vec<String>, snapshot: &GraphSnapshot) {
    lines.push(format!("Nodes: {}", snapshot.nodes.len()));
    lines.push(format!("Edges: {}", snapshot.edges.len()));
    lines.push(format!("  Positive: {}", snapshot.positive_edge_count()));
    lines.push(format!("  Negative: {}", snapshot.negative_edge_count()));
}

fn scores(lines: &mut Vec<String>, summary: &FinalSummary) {
    lines.push(String::new());
    lines.push("Final social scores (friends - enemies):".to_string());
    for (node, score) in &summary.scores {
        lines.push(format!("  {}: {:+}", node, score));
    }
}

fn cascade_step(lines: &mut Vec<String>, step: &CascadeStep) {
    lines.push(String::new());
    lines.push(format!("--- STEP {} ---", step.step));
    lines.push(format!("{} under pressure", step.decision.actor().to_uppercase()));
    lines.push(format!("  {}", step.decision.rationale()));
    if let Some(delta) = step.decision.triangle_delta() {
        lines.push(format!(
            "  Action: {} (triangle delta {:+}, {} candidate moves)",
            change_line(&step.decision),
            delta,
            step.candidates
        ));
    }
    if !step.stuck.is_empty() {
        lines.push(format!("  Stuck this round: [{}]", step.stuck.join(", ")));
    }
    if step.new_pressured.is_empty() {
        lines.push("  No new pressured nodes.".to_string());
    } else {
        lines.push(format!("  New pressured nodes: [{}]", step.new_pressured.join(", ")));
    }
}

pub fn cascade_narrative(report: &CascadeReport) -> String {
    let mut lines = vec![
        RULE.to_string(),
        "MIMETIC CASCADE SIMULATION".to_string(),
        RULE.to_string(),
        String::new(),
        "=== INITIAL STATE ===".to_string(),
    ];
    edge_counts(&mut lines, &report.initial_state);
    lines.push(format!("Rationality: {}", report.rationality));
    lines.push(match report.seed {
        Some(seed) => format!("Seed: {}", seed),
        None => "Seed: none (not reproducible)".to_string(),
    });

    lines.push(String::new());
    match &report.perturbation {
        Some(step) => {
            lines.push("=== PERTURBATION ===".to_string());
            lines.push(step.decision.rationale().to_string());
            lines.push(format!("  Edge {}", change_line(&step.decision)));
        }
        None => {
            lines.push("=== NO PERTURBATION ===".to_string());
            lines.push("Running cascade from initial state imbalances".to_string());
        }
    }

    lines.push(String::new());
    if report.steps.is_empty() {
        lines.push("=== CASCADE ===".to_string());
        lines.push("No cascade occurred".to_string());
    } else {
        lines.push(format!("=== CASCADE ({} steps) ===", report.steps.len()));
        for step in &report.steps {
            cascade_step(&mut lines, step);
        }
    }

    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.push("=== FINAL STATE ===".to_string());
    lines.push(match &report.outcome {
        CascadeOutcome::Stable => "Status: CONVERGED (stable)".to_string(),
        CascadeOutcome::MaxStepsExceeded { max_steps } => {
            format!("Status: MAX STEPS REACHED ({} steps)", max_steps)
        }
        CascadeOutcome::Stuck { nodes } => {
            format!("Status: STUCK ({} cannot act without a take-back)", nodes.join(", "))
        }
    });
    lines.push(format!("Total flips: {}", report.total_flips()));
    lines.push(format!("Unbalanced triangles left: {}", report.summary.unbalanced_triangles));
    lines.push(String::new());
    lines.push("Final edges:".to_string());
    lines.push(format!("  Positive: {}", report.summary.positive_edges));
    lines.push(format!("  Negative: {}", report.summary.negative_edges));
    scores(&mut lines, &report.summary);
    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.join("\n")
}

// === CONTAGION ===

fn phase_label(phase: ContagionPhase) -> &'static str {
    match phase {
        ContagionPhase::Initializing => "ACCUSE",
        ContagionPhase::Propagating => "SPREAD",
        ContagionPhase::Unreached => "UNREACHED",
        ContagionPhase::CommunityCleanup => "CLEANUP",
    }
}

/// One line per edge change; no-ops are left out
pub fn contagion_chain(report: &ContagionReport) -> String {
    report
        .actions()
        .map(|step| {
            let rule = step
                .decision
                .rule()
                .map(|r| format!(" [{}]", r))
                .unwrap_or_default();
            format!(
                "{} {}: {} {}{}",
                phase_label(step.phase),
                step.index,
                step.decision.actor(),
                change_line(&step.decision),
                rule
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn name_list(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".to_string()
    } else {
        names.join(", ")
    }
}

pub fn contagion_narrative(report: &ContagionReport) -> String {
    let mut lines = vec![
        RULE.to_string(),
        "MIMETIC CONTAGION SIMULATION".to_string(),
        RULE.to_string(),
        String::new(),
        "=== INITIAL STATE ===".to_string(),
    ];
    edge_counts(&mut lines, &report.initial_state);
    lines.push(format!("Scapegoat: {}", report.scapegoat));
    lines.push(format!("Accuser: {}", report.accuser));

    let mut phase = None;
    for step in &report.steps {
        if phase != Some(step.phase) {
            lines.push(String::new());
            lines.push(format!("=== {} ===", phase_label(step.phase)));
            phase = Some(step.phase);
        }
        lines.push(match step.decision.rule() {
            Some(rule) => format!("  [{}] {}", rule, step.decision.rationale()),
            None => format!("  {}", step.decision.rationale()),
        });
    }

    if !report.warnings.is_empty() {
        lines.push(String::new());
        lines.push("=== WARNINGS ===".to_string());
        for warning in &report.warnings {
            lines.push(match warning {
                ContagionWarning::AccuserIsolated { accuser } => {
                    format!("  {} has no friends; the accusation did not spread", accuser)
                }
                ContagionWarning::UnreachedNodes { nodes } => {
                    format!("  Outside the accuser's friendship network: {}", nodes.join(", "))
                }
            });
        }
    }

    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.push("=== FINAL STATE ===".to_string());
    lines.push(format!("Accusers: {}", name_list(&report.accusers)));
    lines.push(format!("Defenders: {}", name_list(&report.defenders)));
    lines.push(format!("Neutral: {}", name_list(&report.neutral)));
    lines.push(format!("All against one: {}", yes_no(report.all_against_one)));
    lines.push(format!("Balanced: {}", yes_no(report.summary.balanced)));
    scores(&mut lines, &report.summary);
    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimetic_events::{EdgeKey, Sign};

    fn flip(step: usize, actor: &str, target: &str) -> CascadeStep {
        CascadeStep {
            step,
            decision: Decision::FlipForPressure {
                actor: actor.into(),
                target: target.into(),
                edge: EdgeKey::new(actor, target),
                from: Sign::Positive,
                to: Sign::Negative,
                triangle_delta: 0,
                rationale: format!("{} breaks with {}", actor, target),
            },
            new_pressured: Vec::new(),
            stuck: Vec::new(),
            candidates: 4,
        }
    }

    fn report() -> CascadeReport {
        CascadeReport {
            initial_state: GraphSnapshot::new(),
            perturbation: Some(CascadeStep {
                step: 0,
                decision: Decision::Perturb {
                    actor: "Alice".into(),
                    target: "Betty".into(),
                    edge: EdgeKey::new("Alice", "Betty"),
                    from: Sign::Positive,
                    to: Sign::Negative,
                    triangle_delta: -2,
                    rationale: "External event".into(),
                },
                new_pressured: Vec::new(),
                stuck: Vec::new(),
                candidates: 1,
            }),
            steps: vec![flip(1, "Alice", "Charlie")],
            final_state: GraphSnapshot::new(),
            outcome: CascadeOutcome::Stable,
            rationality: 1.0,
            seed: Some(42),
            summary: FinalSummary::default(),
        }
    }

    #[test]
    fn test_cascade_chain() {
        assert_eq!(
            cascade_chain(&report()),
            "PERTURB: Alice↔Betty +→-\nSTEP 1: Alice flips Alice↔Charlie +→-"
        );
    }

    #[test]
    fn test_cascade_chain_without_perturbation() {
        let mut report = report();
        report.perturbation = None;
        report.outcome = CascadeOutcome::Stuck {
            nodes: vec!["David".into()],
        };
        let chain = cascade_chain(&report);
        assert!(chain.starts_with("NO PERTURBATION"));
        assert!(chain.ends_with("STUCK: David (no take-backs)"));
    }

    #[test]
    fn test_cascade_narrative_sections() {
        let text = cascade_narrative(&report());
        assert!(text.contains("=== PERTURBATION ==="));
        assert!(text.contains("--- STEP 1 ---"));
        assert!(text.contains("Status: CONVERGED (stable)"));
        assert!(text.contains("Total flips: 2"));
    }

    #[test]
    fn test_json_format_round_trips() {
        let original = report();
        let json = format_cascade(&original, ReportFormat::Json).unwrap();
        assert_eq!(CascadeReport::from_json(&json).unwrap(), original);
    }

    #[test]
    fn test_contagion_chain_skips_no_ops() {
        use mimetic_events::{ContagionStep, ContagionRule};

        let step = |index, phase, decision| ContagionStep { index, phase, decision };
        let report = ContagionReport {
            initial_state: GraphSnapshot::new(),
            scapegoat: "Betty".into(),
            accuser: "Alice".into(),
            steps: vec![
                step(
                    0,
                    ContagionPhase::Initializing,
                    Decision::Accuse {
                        actor: "Alice".into(),
                        scapegoat: "Betty".into(),
                        edge: EdgeKey::new("Alice", "Betty"),
                        from: Some(Sign::Positive),
                        to: Sign::Negative,
                        rationale: String::new(),
                    },
                ),
                step(
                    1,
                    ContagionPhase::Propagating,
                    Decision::NoAction {
                        actor: "Alice".into(),
                        rationale: String::new(),
                    },
                ),
                step(
                    2,
                    ContagionPhase::Propagating,
                    Decision::JoinAccusers {
                        actor: "Charlie".into(),
                        scapegoat: "Betty".into(),
                        source: "Alice".into(),
                        edge: EdgeKey::new("Charlie", "Betty"),
                        from: Sign::Positive,
                        to: Sign::Negative,
                        rationale: String::new(),
                    },
                ),
            ],
            final_state: GraphSnapshot::new(),
            accusers: vec!["Alice".into(), "Charlie".into()],
            defenders: Vec::new(),
            neutral: Vec::new(),
            all_against_one: true,
            warnings: Vec::new(),
            seed: Some(1),
            summary: FinalSummary::default(),
        };

        let chain = contagion_chain(&report);
        assert_eq!(
            chain,
            format!(
                "ACCUSE 0: Alice Alice↔Betty +→-\nSPREAD 2: Charlie Betty↔Charlie +→- [{}]",
                ContagionRule::ForcedChoice
            )
        );
        assert!(contagion_narrative(&report).contains("All against one: yes"));
    }

    #[test]
    fn test_all_format_has_every_section() {
        let text = format_cascade(&report(), ReportFormat::All).unwrap();
        let human = text.find("HUMAN FORMAT").unwrap();
        let json = text.find("JSON FORMAT").unwrap();
        let chain = text.find("CHAIN FORMAT").unwrap();
        assert!(human < json && json < chain);
        assert!(text.starts_with(&format!("\n{}\nHUMAN FORMAT\n{}\n", RULE, RULE)));
        assert!(text.ends_with("STEP 1: Alice flips Alice↔Charlie +→-"));
        assert!(text.contains("\"rationality\""));
    }

    #[test]
    fn test_report_file_labels() {
        let files: Vec<_> = ReportFormat::All
            .expand()
            .iter()
            .map(|f| format!("{}.{}", f.label(), f.extension()))
            .collect();
        assert_eq!(files, ["human.txt", "json.json", "chain.txt"]);
        assert_eq!(ReportFormat::Chain.expand(), &[ReportFormat::Chain]);
        assert_eq!(ReportFormat::default(), ReportFormat::All);
    }

    #[test]
    fn test_report_base_name() {
        assert_eq!(
            report_base_name("Alice-Betty-Charlie-David", "Alice-Betty", Some(42)),
            "Alice-Betty-Charlie-David_Alice-Betty_seed42"
        );
        assert_eq!(report_base_name("salem", "none", None), "salem_none_random");
    }

    #[test]
    fn test_narrative_layout() {
        let text = cascade_narrative(&report());
        assert!(text.starts_with(&format!("{}\nMIMETIC CASCADE SIMULATION\n{}\n\n=== INITIAL STATE ===\n", RULE, RULE)));
        assert!(text.contains("Seed: 42\n\n=== PERTURBATION ===\nExternal event\n"));
        assert!(text.ends_with(&format!("\n\n{}", RULE)));
    }
}
