use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use cytosentry_core::alerts::{AlertContext, evaluate_alerts};
use cytosentry_core::mitigation::{MitigationSimulator, SimulationRequest};
use cytosentry_core::models::{
    AlertCode, ClinicalState, LabPanel, PriorSpec, RiskLevel, ToxGrade, VitalSigns,
};
use cytosentry_core::scores::{ScoreInputs, score_all};
use cytosentry_core::signal::{LedgerDecision, MemoryLedger, RateLedger, SqliteLedger};
use cytosentry_core::{aggregate_risk, posterior};

fn stormy_labs() -> LabPanel {
    let mut labs = LabPanel::new();
    labs.insert("ferritin", 6500.0, "ng/mL");
    labs.insert("crp", 180.0, "mg/L");
    labs.insert("ldh", 900.0, "U/L");
    labs.insert("creatinine", 1.6, "mg/dL");
    labs.insert("platelets", 45.0, "10^9/L");
    labs.insert("anc", 0.8, "10^9/L");
    labs.insert("hemoglobin", 8.1, "g/dL");
    labs.insert("fibrinogen", 1.6, "g/L");
    labs.insert("triglycerides", 4.2, "mmol/L");
    labs.insert("ast", 140.0, "U/L");
    labs.insert("wbc", 2.4, "10^9/L");
    labs
}

fn stormy_vitals() -> VitalSigns {
    VitalSigns {
        systolic_bp: Some(84.0),
        diastolic_bp: Some(48.0),
        heart_rate: Some(128.0),
        respiratory_rate: Some(26.0),
        spo2: Some(91.0),
        temperature: Some(39.9),
    }
}

fn stormy_clinical() -> ClinicalState {
    ClinicalState {
        crs_grade: ToxGrade::Grade3,
        icans_grade: ToxGrade::Grade1,
        ice_score: Some(7),
        vasopressor_support: true,
        organomegaly: true,
        ..ClinicalState::default()
    }
}

#[test]
fn full_pipeline_is_call_site_invariant() {
    let labs = stormy_labs();
    let vitals = stormy_vitals();
    let clinical = stormy_clinical();
    let model_outputs = score_all(&ScoreInputs {
        labs: &labs,
        vitals: &vitals,
        clinical: &clinical,
    });

    // Two independent consumers assemble the snapshot themselves; the type
    // forces both to carry clinical state, and the alert lists are identical.
    let dashboard_view = AlertContext {
        labs: labs.clone(),
        vitals,
        clinical,
        model_outputs: model_outputs.clone(),
    };
    let report_view = AlertContext {
        labs,
        vitals,
        clinical,
        model_outputs,
    };

    let from_dashboard = evaluate_alerts(&dashboard_view);
    let from_report = evaluate_alerts(&report_view);
    assert_eq!(from_dashboard, from_report);
    assert!(!from_dashboard.is_empty());
    assert!(
        from_dashboard
            .iter()
            .any(|a| a.code == AlertCode::HlhProbability)
    );
    assert!(from_dashboard.iter().any(|a| a.code == AlertCode::SevereCrs));
}

#[test]
fn composite_risk_escalates_to_the_worst_contribution() {
    let labs = stormy_labs();
    let vitals = stormy_vitals();
    let clinical = stormy_clinical();
    let results = score_all(&ScoreInputs {
        labs: &labs,
        vitals: &vitals,
        clinical: &clinical,
    });
    let composite = aggregate_risk(&results).expect("aggregate");

    // The fulminant panel drives the HScore into its critical tier, and the
    // composite must never understate that.
    assert_eq!(composite.risk_level, RiskLevel::Critical);
    assert!(composite.skipped.is_empty());
    assert_eq!(composite.contributing.len(), results.len());
}

#[test]
fn partial_panel_is_reported_as_not_evaluated() {
    let mut labs = LabPanel::new();
    labs.insert("ldh", 300.0, "U/L");
    labs.insert("creatinine", 1.0, "mg/dL");
    labs.insert("platelets", 150.0, "10^9/L");
    let vitals = VitalSigns::default();
    let clinical = ClinicalState::default();

    let results = score_all(&ScoreInputs {
        labs: &labs,
        vitals: &vitals,
        clinical: &clinical,
    });
    let composite = aggregate_risk(&results).expect("aggregate");

    assert_eq!(composite.contributing.len(), 1); // easix only
    assert_eq!(composite.skipped.len(), results.len() - 1);
    for skipped in &composite.skipped {
        assert!(!skipped.missing_inputs.is_empty(), "{}", skipped.model);
    }
}

#[test]
fn posterior_reference_case_and_rejection() {
    let prior = PriorSpec::new(2.0, 5.0, "phase II registry pool").expect("prior");
    let estimate = posterior(&prior, 3, 10).expect("posterior");
    assert_eq!(estimate.alpha, 5.0);
    assert_eq!(estimate.beta, 12.0);
    assert!((estimate.mean - 0.294).abs() < 0.01);

    assert!(posterior(&prior, 11, 10).is_err());
}

#[test]
fn simulator_repeats_bitwise_and_respects_independence() {
    let simulator = MitigationSimulator::new();
    let request = SimulationRequest {
        baseline_risk: 0.40,
        mitigations: vec!["tocilizumab".to_string(), "corticosteroids".to_string()],
        correlation: 0.0,
        samples: 10_000,
        seed: 2024,
    };
    let first = simulator.simulate(&request).expect("simulate");
    let second = simulator.simulate(&request).expect("simulate");
    assert_eq!(first, second);

    // Independent combination: product of the two expected residual factors.
    let toci = 0.85 * 0.55 + 0.15;
    let steroids = 0.80 * 0.70 + 0.20;
    let expected = 0.40 * toci * steroids;
    assert!((first.mitigated_risk_mean - expected).abs() < 0.01);
}

#[test]
fn memory_ledger_holds_budget_under_concurrent_load() {
    let ledger = Arc::new(MemoryLedger::new(10).expect("ledger"));
    let granted = Arc::new(AtomicU32::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            let granted = Arc::clone(&granted);
            thread::spawn(move || {
                for _ in 0..25 {
                    if matches!(ledger.try_acquire(), Ok(LedgerDecision::Granted)) {
                        granted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }

    // 200 attempts inside one rolling window, at most the budget granted.
    assert_eq!(granted.load(Ordering::SeqCst), 10);
}

#[test]
fn sqlite_ledger_holds_budget_across_handles_under_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("shared-ledger.sqlite3");
    let granted = Arc::new(AtomicU32::new(0));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            // Each worker opens its own handle, as separate processes would.
            let ledger = SqliteLedger::open(&path, 6).expect("open ledger");
            let granted = Arc::clone(&granted);
            thread::spawn(move || {
                for _ in 0..10 {
                    if matches!(ledger.try_acquire(), Ok(LedgerDecision::Granted)) {
                        granted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("thread");
    }

    assert_eq!(granted.load(Ordering::SeqCst), 6);
}
